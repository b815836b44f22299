//! Role Normalizer: maps a free-text job title onto a canonical (family, level) pair.
//!
//! Pattern tables are compiled once into statics and never mutated. Every lookup is
//! ordered: the first family / level / boost entry that matches wins, so table order
//! is part of the behaviour.
//!
//! Never fails. No family match → `operations` at low confidence; no level match → `mid`.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::compensation::models::{Geo, JobFamily, JobLevel, LocationType, RoleProfile};

const TITLE_MATCH_CONFIDENCE: f64 = 0.9;
const CONTEXT_MATCH_CONFIDENCE: f64 = 0.7;
const FALLBACK_FAMILY_CONFIDENCE: f64 = 0.3;
const DEFAULT_LEVEL_CONFIDENCE: f64 = 0.5;
/// Penalty applied when the level keyword only appears in the free-text context.
const CONTEXT_LEVEL_PENALTY: f64 = 0.2;
/// Highest level a context-only keyword may set. Postings name the managers and
/// executives a hire reports to, not the hire's own seniority.
const MAX_CONTEXT_LEVEL: JobLevel = JobLevel::Senior;
const BOOST_THRESHOLD: f64 = 0.8;
const BOOSTED_LEVEL_CONFIDENCE: f64 = 0.7;
const ALTERNATIVES_BELOW: u8 = 70;
const ALTERNATIVE_CONFIDENCE: u8 = 50;
const MAX_ALTERNATIVES: usize = 3;

// ────────────────────────────────────────────────────────────────────────────
// Output models
// ────────────────────────────────────────────────────────────────────────────

/// Role profile as far as the title can tell. Location is only present when
/// the text mentions it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialRoleProfile {
    pub title: String,
    pub normalized_title: String,
    pub job_family: JobFamily,
    pub job_level: JobLevel,
    pub location_type: Option<LocationType>,
    pub geo: Option<Geo>,
}

impl PartialRoleProfile {
    pub fn complete(self, location_type: LocationType, geo: Geo) -> RoleProfile {
        RoleProfile {
            title: self.title,
            normalized_title: self.normalized_title,
            job_family: self.job_family,
            job_level: self.job_level,
            location_type,
            geo,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeMapping {
    pub job_family: JobFamily,
    pub job_level: JobLevel,
    pub confidence: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleNormalization {
    pub role_profile: PartialRoleProfile,
    /// 0 – 100
    pub confidence: u8,
    pub alternative_mappings: Vec<AlternativeMapping>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInference {
    pub location_type: LocationType,
    pub geo: Geo,
}

// ────────────────────────────────────────────────────────────────────────────
// Pattern tables
// ────────────────────────────────────────────────────────────────────────────

/// Family order matters: more specific families come before the broad ones
/// (data science before engineering, design before product).
const FAMILY_PATTERNS: &[(JobFamily, &[&str])] = &[
    (
        JobFamily::DataScience,
        &[
            r"\bdata scien",
            r"\bmachine learning\b",
            r"\bml\b",
            r"\banalytics\b",
            r"\bdata analyst\b",
            r"\bstatistician\b",
        ],
    ),
    (
        JobFamily::Engineering,
        &[
            r"\bengineer",
            r"\bdeveloper\b",
            r"\bprogrammer\b",
            r"\bsoftware\b",
            r"\bdevops\b",
            r"\bsre\b",
            r"\bfull[- ]?stack\b",
            r"\bback[- ]?end\b",
            r"\bfront[- ]?end\b",
            r"\binfrastructure\b",
            r"\barchitect\b",
            r"\bcto\b",
            r"\bchief technology\b",
        ],
    ),
    (
        JobFamily::Design,
        &[
            r"\bdesign",
            r"\bux\b",
            r"\bui\b",
            r"\buser experience\b",
            r"\billustrator\b",
        ],
    ),
    (
        JobFamily::Product,
        &[
            r"\bproduct manager\b",
            r"\bproduct owner\b",
            r"\bproduct management\b",
            r"\bcpo\b",
            r"\bchief product\b",
            r"\bproduct\b",
        ],
    ),
    (
        JobFamily::Marketing,
        &[
            r"\bmarketing\b",
            r"\bgrowth\b",
            r"\bbrand\b",
            r"\bcontent\b",
            r"\bseo\b",
            r"\bdemand gen",
            r"\bcommunications\b",
            r"\bcommunity\b",
            r"\bcmo\b",
        ],
    ),
    (
        JobFamily::Sales,
        &[
            r"\bsales\b",
            r"\baccount executive\b",
            r"\bbusiness development\b",
            r"\bbdr\b",
            r"\bsdr\b",
            r"\bcro\b",
            r"\brevenue\b",
            r"\bpartnerships\b",
        ],
    ),
    (
        JobFamily::CustomerSuccess,
        &[
            r"\bcustomer success\b",
            r"\bcustomer support\b",
            r"\bcustomer experience\b",
            r"\bsupport\b",
            r"\baccount manager\b",
            r"\bimplementation\b",
            r"\bonboarding\b",
        ],
    ),
    (
        JobFamily::Finance,
        &[
            r"\bfinance\b",
            r"\bfinancial\b",
            r"\baccountant\b",
            r"\baccounting\b",
            r"\bcontroller\b",
            r"\bfp&a\b",
            r"\btreasur",
            r"\bcfo\b",
        ],
    ),
    (
        JobFamily::Legal,
        &[
            r"\blegal\b",
            r"\bcounsel\b",
            r"\battorney\b",
            r"\blawyer\b",
            r"\bparalegal\b",
            r"\bcompliance\b",
            r"\bclo\b",
        ],
    ),
    (
        JobFamily::HrPeople,
        &[
            r"\brecruit",
            r"\btalent\b",
            r"\bpeople\b",
            r"\bhr\b",
            r"\bhuman resources\b",
            r"\bchro\b",
        ],
    ),
    (
        JobFamily::Operations,
        &[
            r"\boperations\b",
            r"\bops\b",
            r"\bchief operating\b",
            r"\bcoo\b",
            r"\bchief of staff\b",
            r"\bprogram manager\b",
            r"\bproject manager\b",
            r"\blogistics\b",
            r"\bsupply chain\b",
        ],
    ),
    (
        JobFamily::Executive,
        &[
            r"\bceo\b",
            r"\bchief executive\b",
            r"\bco-?founder\b",
            r"\bfounder\b",
            r"\bpresident\b",
            r"\bgeneral manager\b",
            r"\bmanaging director\b",
        ],
    ),
];

/// Ordered level table: (level, confidence, patterns). A level may appear more
/// than once when a phrase has to be caught before a broader rule.
const LEVEL_PATTERNS: &[(JobLevel, f64, &[&str])] = &[
    (
        JobLevel::Intern,
        0.95,
        &[r"\bintern(?:ship)?\b", r"\bco-?op\b", r"\bapprentice\b"],
    ),
    (JobLevel::Director, 0.9, &[r"\bchief of staff\b"]),
    (
        JobLevel::CLevel,
        0.95,
        &[
            r"\bchief\b",
            r"\bc[efimoprst]o\b",
            r"\bchro\b",
            r"\bco-?founder\b",
        ],
    ),
    (
        JobLevel::Vp,
        0.95,
        &[r"\bvp\b", r"\bvice president\b", r"\b[es]vp\b"],
    ),
    (JobLevel::Director, 0.9, &[r"\bdirector\b"]),
    (
        JobLevel::Principal,
        0.9,
        &[r"\bprincipal\b", r"\bdistinguished\b", r"\bfellow\b"],
    ),
    (JobLevel::Staff, 0.9, &[r"\bstaff\b"]),
    (
        JobLevel::Senior,
        0.9,
        &[
            r"\bsenior\b",
            r"\bsr\b",
            r"\biii\b",
            r"\b(?:level|l)\s?[45]\b",
            r"\b(?:engineer|developer|analyst|scientist|designer)\s*3\b",
        ],
    ),
    (
        JobLevel::Mid,
        0.8,
        &[
            r"\bmid(?:-level)?\b",
            r"\bintermediate\b",
            r"\bii\b",
            r"\b(?:level|l)\s?3\b",
            r"\b(?:engineer|developer|analyst|scientist|designer)\s*2\b",
        ],
    ),
    (
        JobLevel::Junior,
        0.85,
        &[
            r"\bjunior\b",
            r"\bjr\b",
            r"\bentry[- ]level\b",
            r"\bassociate\b",
            r"\bgraduate\b",
            r"\bnew grad\b",
            r"\b(?:level|l)\s?[12]\b",
            r"\b(?:engineer|developer|analyst|scientist|designer)\s*(?:1|i)\b",
        ],
    ),
];

/// Seniority boosts, strongest first. Only the first match applies.
/// `unless` exempts titles where the keyword is the role noun itself
/// ("Product Manager" is not a people manager).
struct BoostRule {
    pattern: &'static str,
    steps: usize,
    unless: Option<&'static str>,
}

const BOOST_RULES: &[BoostRule] = &[
    BoostRule {
        pattern: r"\bchief\b",
        steps: 5,
        unless: None,
    },
    BoostRule {
        pattern: r"\bvp\b|\bvice president\b",
        steps: 4,
        unless: None,
    },
    BoostRule {
        pattern: r"\bhead\b",
        steps: 4,
        unless: None,
    },
    BoostRule {
        pattern: r"\bdirector\b",
        steps: 3,
        unless: None,
    },
    BoostRule {
        pattern: r"\bmanager\b|\bmanaging\b",
        steps: 2,
        unless: Some(
            r"\b(?:product|project|program|account|customer success|office|community|content)\s+manager\b",
        ),
    },
    BoostRule {
        pattern: r"\blead\b|\bleader\b",
        steps: 1,
        unless: None,
    },
];

const REMOTE_PATTERN: &str =
    r"\bremote\b|\bfully distributed\b|\bwork from home\b|\bwfh\b|\banywhere\b";
const HYBRID_PATTERN: &str = r"\bhybrid\b";

const CITY_PATTERNS: &[(Geo, &str)] = &[
    (
        Geo::Sv,
        r"\bsan francisco\b|\bsf\b|\bbay area\b|\bsilicon valley\b|\bpalo alto\b|\bmountain view\b|\bsan jose\b|\bmenlo park\b|\bsunnyvale\b",
    ),
    (
        Geo::Nyc,
        r"\bnew york\b|\bnyc\b|\bmanhattan\b|\bbrooklyn\b",
    ),
    (Geo::Seattle, r"\bseattle\b|\bbellevue\b|\bredmond\b"),
    (Geo::Boston, r"\bboston\b|\bcambridge,? ma\b"),
    (
        Geo::La,
        r"\blos angeles\b|\bsanta monica\b|\bvenice beach\b",
    ),
    (Geo::Austin, r"\baustin\b"),
    (Geo::Denver, r"\bdenver\b|\bboulder\b"),
    (Geo::Chicago, r"\bchicago\b"),
    (
        Geo::International,
        r"\blondon\b|\bberlin\b|\bparis\b|\bamsterdam\b|\bdublin\b|\btoronto\b|\bvancouver\b|\bsingapore\b|\bbangalore\b|\bbengaluru\b|\btel aviv\b|\bsydney\b|\btokyo\b|\bsão paulo\b|\bsao paulo\b",
    ),
];

fn compile(patterns: &[&str]) -> Regex {
    let alternation = patterns.join("|");
    Regex::new(&format!("(?i){alternation}")).expect("static role pattern must compile")
}

static FAMILY_TABLE: LazyLock<Vec<(JobFamily, Regex)>> = LazyLock::new(|| {
    FAMILY_PATTERNS
        .iter()
        .map(|(family, patterns)| (*family, compile(patterns)))
        .collect()
});

static LEVEL_TABLE: LazyLock<Vec<(JobLevel, f64, Regex)>> = LazyLock::new(|| {
    LEVEL_PATTERNS
        .iter()
        .map(|(level, confidence, patterns)| (*level, *confidence, compile(patterns)))
        .collect()
});

static BOOST_TABLE: LazyLock<Vec<(Regex, usize, Option<Regex>)>> = LazyLock::new(|| {
    BOOST_RULES
        .iter()
        .map(|rule| {
            (
                compile(&[rule.pattern]),
                rule.steps,
                rule.unless.map(|u| compile(&[u])),
            )
        })
        .collect()
});

static REMOTE_RE: LazyLock<Regex> = LazyLock::new(|| compile(&[REMOTE_PATTERN]));
static HYBRID_RE: LazyLock<Regex> = LazyLock::new(|| compile(&[HYBRID_PATTERN]));
static CITY_TABLE: LazyLock<Vec<(Geo, Regex)>> = LazyLock::new(|| {
    CITY_PATTERNS
        .iter()
        .map(|(geo, pattern)| (*geo, compile(&[pattern])))
        .collect()
});

// ────────────────────────────────────────────────────────────────────────────
// Normalization
// ────────────────────────────────────────────────────────────────────────────

/// Normalizes a raw title (plus optional free-text context such as a job posting
/// blurb) into a role profile with a 0 – 100 confidence.
pub fn normalize(title: &str, context: Option<&str>) -> RoleNormalization {
    let title = title.trim();
    let search_text = match context {
        Some(ctx) if !ctx.trim().is_empty() => format!("{title} {}", ctx.trim()),
        _ => title.to_string(),
    };

    let (job_family, family_confidence) = match_family(title, &search_text);
    let (mut job_level, mut level_confidence) = match_level(title, &search_text);

    if level_confidence < BOOST_THRESHOLD {
        if let Some(steps) = seniority_boost(title) {
            job_level = job_level.max(job_level.boosted(steps));
            level_confidence = BOOSTED_LEVEL_CONFIDENCE;
        }
    }

    let confidence = (((family_confidence + level_confidence) / 2.0) * 100.0)
        .round()
        .clamp(0.0, 100.0) as u8;

    let alternative_mappings = if confidence < ALTERNATIVES_BELOW {
        alternative_families(&search_text, job_family)
            .into_iter()
            .map(|family| AlternativeMapping {
                job_family: family,
                job_level,
                confidence: ALTERNATIVE_CONFIDENCE,
            })
            .collect()
    } else {
        Vec::new()
    };

    let location = infer_location(&search_text);

    RoleNormalization {
        role_profile: PartialRoleProfile {
            title: title.to_string(),
            normalized_title: canonical_title(job_family, job_level),
            job_family,
            job_level,
            location_type: location.map(|l| l.location_type),
            geo: location.map(|l| l.geo),
        },
        confidence,
        alternative_mappings,
    }
}

/// First family to match wins; a later family only replaces it with a strictly
/// higher confidence (title hit beats context-only hit).
fn match_family(title: &str, search_text: &str) -> (JobFamily, f64) {
    let mut best: Option<(JobFamily, f64)> = None;

    for (family, pattern) in FAMILY_TABLE.iter() {
        let confidence = if pattern.is_match(title) {
            TITLE_MATCH_CONFIDENCE
        } else if pattern.is_match(search_text) {
            CONTEXT_MATCH_CONFIDENCE
        } else {
            continue;
        };

        if best.map_or(true, |(_, current)| confidence > current) {
            best = Some((*family, confidence));
        }
        if confidence >= TITLE_MATCH_CONFIDENCE {
            break;
        }
    }

    best.unwrap_or((JobFamily::Operations, FALLBACK_FAMILY_CONFIDENCE))
}

fn match_level(title: &str, search_text: &str) -> (JobLevel, f64) {
    let in_title = LEVEL_TABLE
        .iter()
        .find(|(_, _, pattern)| pattern.is_match(title))
        .map(|(level, confidence, _)| (*level, *confidence));

    if let Some(hit) = in_title {
        return hit;
    }

    LEVEL_TABLE
        .iter()
        .filter(|(level, _, _)| *level <= MAX_CONTEXT_LEVEL)
        .find(|(_, _, pattern)| pattern.is_match(search_text))
        .map(|(level, confidence, _)| (*level, confidence - CONTEXT_LEVEL_PENALTY))
        .unwrap_or((JobLevel::Mid, DEFAULT_LEVEL_CONFIDENCE))
}

/// Boosts only look at the title: context prose mentions managers and leads
/// the candidate merely works with.
fn seniority_boost(title: &str) -> Option<usize> {
    BOOST_TABLE
        .iter()
        .find(|(pattern, _, unless)| {
            pattern.is_match(title) && !unless.as_ref().is_some_and(|u| u.is_match(title))
        })
        .map(|(_, steps, _)| *steps)
}

fn alternative_families(search_text: &str, winner: JobFamily) -> Vec<JobFamily> {
    FAMILY_TABLE
        .iter()
        .filter(|(family, pattern)| *family != winner && pattern.is_match(search_text))
        .map(|(family, _)| *family)
        .take(MAX_ALTERNATIVES)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Location inference
// ────────────────────────────────────────────────────────────────────────────

/// Remote keywords take precedence over everything else, then hybrid (with the
/// mentioned city, else `sv`), then a bare city means onsite.
/// Returns `None` when nothing matches; the caller must supply a location.
pub fn infer_location(text: &str) -> Option<LocationInference> {
    if REMOTE_RE.is_match(text) {
        return Some(LocationInference {
            location_type: LocationType::Remote,
            geo: Geo::RemoteUs,
        });
    }

    let city = CITY_TABLE
        .iter()
        .find(|(_, pattern)| pattern.is_match(text))
        .map(|(geo, _)| *geo);

    if HYBRID_RE.is_match(text) {
        return Some(LocationInference {
            location_type: LocationType::Hybrid,
            geo: city.unwrap_or(Geo::Sv),
        });
    }

    city.map(|geo| LocationInference {
        location_type: LocationType::Onsite,
        geo,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Canonical titles
// ────────────────────────────────────────────────────────────────────────────

fn base_title(family: JobFamily) -> &'static str {
    match family {
        JobFamily::Engineering => "Software Engineer",
        JobFamily::Product => "Product Manager",
        JobFamily::Design => "Product Designer",
        JobFamily::DataScience => "Data Scientist",
        JobFamily::Marketing => "Marketing Manager",
        JobFamily::Sales => "Account Executive",
        JobFamily::Operations => "Operations Manager",
        JobFamily::Finance => "Financial Analyst",
        JobFamily::Legal => "Counsel",
        JobFamily::HrPeople => "People Partner",
        JobFamily::CustomerSuccess => "Customer Success Manager",
        JobFamily::Executive => "General Manager",
    }
}

fn function_name(family: JobFamily) -> &'static str {
    match family {
        JobFamily::Engineering => "Engineering",
        JobFamily::Product => "Product",
        JobFamily::Design => "Design",
        JobFamily::DataScience => "Data Science",
        JobFamily::Marketing => "Marketing",
        JobFamily::Sales => "Sales",
        JobFamily::Operations => "Operations",
        JobFamily::Finance => "Finance",
        JobFamily::Legal => "Legal",
        JobFamily::HrPeople => "People",
        JobFamily::CustomerSuccess => "Customer Success",
        JobFamily::Executive => "Business",
    }
}

fn chief_title(family: JobFamily) -> &'static str {
    match family {
        JobFamily::Engineering => "Chief Technology Officer",
        JobFamily::Product => "Chief Product Officer",
        JobFamily::Design => "Chief Design Officer",
        JobFamily::DataScience => "Chief Data Officer",
        JobFamily::Marketing => "Chief Marketing Officer",
        JobFamily::Sales => "Chief Revenue Officer",
        JobFamily::Operations => "Chief Operating Officer",
        JobFamily::Finance => "Chief Financial Officer",
        JobFamily::Legal => "Chief Legal Officer",
        JobFamily::HrPeople => "Chief People Officer",
        JobFamily::CustomerSuccess => "Chief Customer Officer",
        JobFamily::Executive => "Chief Executive Officer",
    }
}

pub fn canonical_title(family: JobFamily, level: JobLevel) -> String {
    let base = base_title(family);
    match level {
        JobLevel::Intern => format!("{base} Intern"),
        JobLevel::Junior => format!("Junior {base}"),
        JobLevel::Mid => base.to_string(),
        JobLevel::Senior => format!("Senior {base}"),
        JobLevel::Staff => format!("Staff {base}"),
        JobLevel::Principal => format!("Principal {base}"),
        JobLevel::Director => format!("Director of {}", function_name(family)),
        JobLevel::Vp => format!("VP of {}", function_name(family)),
        JobLevel::CLevel => chief_title(family).to_string(),
    }
}
