use chrono::NaiveDate;
use regex::Regex;

use crate::dates::parse_date_expression;
use crate::models::ApplicationStatus;

// --- Input / output types ---

/// One raw entry handed to the normalizer: either bare free text
/// ("Applied for zee5 - sdet role") or a partially filled record whose
/// company/notes fields may still contain noisy text.
#[derive(Debug, Clone)]
pub enum IntakeInput {
    Text(String),
    Record(RawIntake),
}

impl From<&str> for IntakeInput {
    fn from(s: &str) -> Self {
        IntakeInput::Text(s.to_string())
    }
}

impl From<String> for IntakeInput {
    fn from(s: String) -> Self {
        IntakeInput::Text(s)
    }
}

impl From<RawIntake> for IntakeInput {
    fn from(raw: RawIntake) -> Self {
        IntakeInput::Record(raw)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RawIntake {
    pub company: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub applied_on: Option<String>,
}

/// A cleaned application record ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeApplication {
    pub company: String,
    pub role: Option<String>,
    pub status: Option<ApplicationStatus>,
    pub notes: Option<String>,
    pub applied_on: Option<NaiveDate>,
}

// Role labels too vague to be worth keeping when anything more specific
// shows up in the same batch.
const GENERIC_ROLES: [&str; 5] = ["software engineer", "developer", "engineer", "sde", "swe"];

// Words that rule a segment out as a company name.
const COMPANY_STOPWORDS: [&str; 30] = [
    "applied", "applying", "apply", "submitted", "sent", "resume", "application", "cv", "for",
    "to", "at", "in", "on", "with", "and", "or", "the", "a", "an", "my", "i", "we", "role",
    "position", "interview", "job", "jobs", "said", "told", "hiring",
];

// --- Entry point ---

/// Normalize a batch of raw chat inputs into clean application records.
///
/// Pure and total: malformed input degrades to omitted fields, never an
/// error. Entries whose company cannot be resolved are dropped.
pub fn normalize_applications_for_creation(
    inputs: &[IntakeInput],
    today: NaiveDate,
) -> Vec<IntakeApplication> {
    // Coerce strings to records, then split multi-company entries.
    let mut entries: Vec<RawIntake> = Vec::new();
    for input in inputs {
        let raw = match input {
            IntakeInput::Text(s) => RawIntake {
                company: Some(s.clone()),
                ..Default::default()
            },
            IntakeInput::Record(r) => r.clone(),
        };
        entries.extend(split_company_list(raw));
    }

    let apps: Vec<IntakeApplication> = entries.iter().map(|e| extract_entry(e, today)).collect();

    let mut apps = dedup_batch(apps);
    backfill_roles(&mut apps);
    apps.retain(|a| !a.company.is_empty());
    apps
}

// --- List splitting ---

// "Applied to Google, Amazon and Meta yesterday for SDE role" is one input
// but three applications. After peeling the verb prefix and the trailing
// role/date clauses, a comma/"and" list where every segment looks like a
// company splits into separate entries sharing the extracted role and date.
fn split_company_list(raw: RawIntake) -> Vec<RawIntake> {
    let Some(company_text) = raw.company.clone() else {
        return vec![raw];
    };

    let stripped = strip_apply_prefix(company_text.trim());
    let tail = strip_trailing_clauses(&stripped);

    // Only a comma-separated run counts as a list; a bare "X and Y" stays
    // one entry so names like "Deloitte and Touche" survive.
    if !tail.rest.contains(',') {
        return vec![raw];
    }
    let Ok(sep) = Regex::new(r"(?i)\s*,\s*(?:and\s+)?|\s+and\s+") else {
        return vec![raw];
    };
    let segments: Vec<&str> = sep
        .split(&tail.rest)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if segments.len() < 2 || !segments.iter().all(|s| looks_like_company(s)) {
        return vec![raw];
    }

    segments
        .into_iter()
        .map(|seg| RawIntake {
            company: Some(seg.to_string()),
            role: raw.role.clone().or_else(|| tail.role.clone()),
            status: raw.status.clone(),
            notes: raw.notes.clone(),
            applied_on: raw.applied_on.clone().or_else(|| tail.date_expr.clone()),
        })
        .collect()
}

fn looks_like_company(text: &str) -> bool {
    let t = text.trim();
    if t.is_empty() || !t.chars().any(char::is_alphanumeric) {
        return false;
    }
    let words: Vec<&str> = t.split_whitespace().collect();
    if words.len() > 5 {
        return false;
    }
    if !t.chars().all(|c| c.is_alphanumeric() || " .&'/()-".contains(c)) {
        return false;
    }
    !words
        .iter()
        .any(|w| COMPANY_STOPWORDS.contains(&w.to_lowercase().as_str()))
}

// --- Per-entry extraction ---

fn extract_entry(raw: &RawIntake, today: NaiveDate) -> IntakeApplication {
    let original = raw.company.as_deref().unwrap_or("").trim().to_string();
    let stripped = strip_apply_prefix(&original);

    let dash = parse_dash_structured(&stripped);
    let sentence = parse_sentence(&original, &stripped);
    let tail = strip_trailing_clauses(&stripped);

    // Company: dash-structured -> sentence -> "add application for X" ->
    // the remaining text with trailing clauses stripped. Sanitized last.
    let company_raw = dash
        .as_ref()
        .map(|d| d.company.clone())
        .or_else(|| sentence.as_ref().map(|s| s.company.clone()))
        .or_else(|| parse_add_application(&original))
        .unwrap_or_else(|| tail.rest.clone());
    let (company, status_from_company) = clean_company(&company_raw);

    // Role: explicit field -> dash segment -> sentence -> trailing "for X
    // role" clause -> pattern match in the company text -> pattern match in
    // the notes text. The first non-generic candidate wins; an all-generic
    // list keeps its first.
    fn push(raw_role: Option<&str>, out: &mut Vec<String>) {
        if let Some(r) = raw_role {
            let canon = canonicalize_role(r);
            if !canon.is_empty() && !out.iter().any(|c| c.eq_ignore_ascii_case(&canon)) {
                out.push(canon);
            }
        }
    }
    let mut candidates: Vec<String> = Vec::new();
    push(raw.role.as_deref(), &mut candidates);
    push(dash.as_ref().and_then(|d| d.role.as_deref()), &mut candidates);
    push(sentence.as_ref().and_then(|s| s.role.as_deref()), &mut candidates);
    push(tail.role.as_deref(), &mut candidates);
    push(find_role_in_text(&original).as_deref(), &mut candidates);
    push(
        raw.notes.as_deref().and_then(|n| find_role_in_text(n)).as_deref(),
        &mut candidates,
    );
    let role = candidates
        .iter()
        .find(|r| !is_generic_role(r))
        .or_else(|| candidates.first())
        .cloned();

    // Notes: explicit field, dash "Notes:" segment, sentence trailing
    // clause, "hr said ..." and "sent resume ..." clauses. Merged with
    // substring-containment dedup.
    fn add_notes(source: Option<String>, acc: &mut Option<String>) {
        if let Some(src) = source {
            let cleaned = clean_notes(&src);
            if !cleaned.is_empty() {
                *acc = Some(match acc.take() {
                    None => cleaned,
                    Some(cur) => merge_notes(cur, cleaned),
                });
            }
        }
    }
    let mut notes: Option<String> = None;
    add_notes(raw.notes.clone(), &mut notes);
    add_notes(dash.as_ref().and_then(|d| d.notes.clone()), &mut notes);
    add_notes(sentence.as_ref().and_then(|s| s.trailing.clone()), &mut notes);
    add_notes(find_hr_said_clause(&original), &mut notes);
    add_notes(find_sent_resume_clause(&original), &mut notes);

    let status = raw
        .status
        .as_deref()
        .and_then(ApplicationStatus::parse)
        .or(status_from_company);

    let applied_on = raw
        .applied_on
        .as_deref()
        .and_then(|s| parse_date_expression(s, today))
        .or_else(|| extract_applied_date(&original, today))
        .or_else(|| {
            tail.date_expr
                .as_deref()
                .and_then(|s| parse_date_expression(s, today))
        });

    IntakeApplication {
        company,
        role,
        status,
        notes,
        applied_on,
    }
}

// --- Prefix / trailing-clause stripping ---

// "i applied to X", "submitted resume to X", "add application for X" -> "X"
fn strip_apply_prefix(text: &str) -> String {
    let pattern = r"(?i)^\W*(?:(?:i|i've|i have|we|just)\s+)*(?:appl(?:ied|y|ying)\s+(?:for|to|at)|submitted\s+(?:my\s+)?(?:resume|application|cv)\s+(?:to|at|for)|sent\s+(?:my\s+)?(?:resume|cv)\s+(?:to|at)|add(?:ed)?\s+(?:an?\s+)?application\s+for)\s+";
    match Regex::new(pattern) {
        Ok(re) => re.replace(text, "").trim().to_string(),
        Err(_) => text.trim().to_string(),
    }
}

#[derive(Debug, Default)]
struct TailParts {
    rest: String,
    role: Option<String>,
    date_expr: Option<String>,
}

const TRAILING_DATE_PATTERN: &str = r"(?i)^(.*?)[\s,;-]*\b(?:on\s+|this\s+)?(today|tomorrow|yesterday|\d{4}-\d{2}-\d{2}|in\s+\d+\s+days?|(?:next\s+|last\s+)?(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday))\s*$";

// Peel trailing role/date/resume clauses off a company string, keeping what
// they said for reuse:
//   "Google, Amazon yesterday for SDE role" -> rest "Google, Amazon",
//   role "SDE", date "yesterday"
fn strip_trailing_clauses(text: &str) -> TailParts {
    let mut parts = TailParts {
        rest: text.trim().to_string(),
        ..Default::default()
    };

    loop {
        let before = parts.rest.clone();

        // "... for <role> role" / "... as <role> position" (role word present)
        if let Ok(re) = Regex::new(
            r"(?i)^(.*?)(?:\s*[-–—,]\s*|\s+)(?:for|as)\s+(?:(?:an?|the)\s+)?([a-z0-9 .+#/&-]{2,40}?)\s+(?:role|position|opening)s?\s*$",
        ) {
            if let Some(c) = re.captures(&parts.rest) {
                if parts.role.is_none() {
                    parts.role = Some(c[2].trim().to_string());
                }
                parts.rest = c[1].trim().to_string();
            }
        }

        // "... for SDE2" without a role word -- only when the tail actually
        // matches a role pattern, so "Institute for Advanced Study" survives.
        if let Ok(re) = Regex::new(
            r"(?i)^(.*?)(?:\s*[-–—,]\s*|\s+)(?:for|as)\s+(?:(?:an?|the)\s+)?([a-z0-9 .+#/&-]{2,40})\s*$",
        ) {
            if let Some(c) = re.captures(&parts.rest) {
                if find_role_in_text(&c[2]).is_some() {
                    if parts.role.is_none() {
                        parts.role = Some(c[2].trim().to_string());
                    }
                    parts.rest = c[1].trim().to_string();
                }
            }
        }

        // "... - sdet role" (dash/comma separator, role word present)
        if let Ok(re) = Regex::new(
            r"(?i)^(.*?)\s*[-–—,]\s*(?:(?:an?|the)\s+)?([a-z0-9 .+#/&-]{2,40}?)\s+(?:role|position|opening)s?\s*$",
        ) {
            if let Some(c) = re.captures(&parts.rest) {
                if parts.role.is_none() {
                    parts.role = Some(c[2].trim().to_string());
                }
                parts.rest = c[1].trim().to_string();
            }
        }

        // trailing date expression: "... yesterday", "... on 2026-03-01"
        if let Ok(re) = Regex::new(TRAILING_DATE_PATTERN) {
            if let Some(c) = re.captures(&parts.rest) {
                if parts.date_expr.is_none() {
                    parts.date_expr = Some(c[2].trim().to_string());
                }
                parts.rest = c[1].trim().to_string();
            }
        }

        // trailing "sent resume ..." clause
        if let Ok(re) = Regex::new(r"(?i)^(.*?)[\s,;-]+(?:sent|submitted)\s+(?:my\s+)?(?:resume|application|cv)\b.*$") {
            if let Some(c) = re.captures(&parts.rest) {
                parts.rest = c[1].trim().to_string();
            }
        }

        if parts.rest == before {
            break;
        }
    }

    parts
}

// --- Dash-structured parse ---

#[derive(Debug)]
struct DashParts {
    company: String,
    role: Option<String>,
    notes: Option<String>,
}

// "Company - Role - Notes: ..." with " - " as the separator, so hyphenated
// names like Coca-Cola stay intact.
fn parse_dash_structured(text: &str) -> Option<DashParts> {
    let sep = Regex::new(r"\s+[-–—]\s+").ok()?;
    let segments: Vec<&str> = sep.split(text).map(str::trim).filter(|s| !s.is_empty()).collect();
    if segments.len() < 2 || !looks_like_company(segments[0]) {
        return None;
    }

    let mut role = None;
    let mut notes: Option<String> = None;
    for seg in &segments[1..] {
        if let Some(rest) = strip_ci_prefix(seg, "notes:") {
            notes = Some(match notes {
                None => rest.trim().to_string(),
                Some(cur) => merge_notes(cur, rest.trim().to_string()),
            });
        } else if role.is_none() && looks_like_role(seg) {
            role = Some(strip_role_suffix(seg));
        } else {
            notes = Some(match notes {
                None => seg.to_string(),
                Some(cur) => merge_notes(cur, seg.to_string()),
            });
        }
    }

    Some(DashParts {
        company: segments[0].to_string(),
        role,
        notes,
    })
}

fn strip_ci_prefix<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    match text.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => Some(&text[prefix.len()..]),
        _ => None,
    }
}

// --- Sentence patterns ---

#[derive(Debug)]
struct SentenceParts {
    company: String,
    role: Option<String>,
    trailing: Option<String>,
}

// "... for/as <role> position at/in <company> ...", the inverse
// "at <company> for/as <role>", and the plain "<role> at <company>".
fn parse_sentence(original: &str, stripped: &str) -> Option<SentenceParts> {
    let forward = Regex::new(
        r"(?i)\b(?:for|as)\s+(?:(?:an?|the)\s+)?([a-z0-9 .+#/&-]{2,40}?)(?:\s+(?:role|position|opening))?\s+(?:at|in|with)\s+([a-z0-9 .&'/()-]{2,40}?)\s*(?:[.,!;|]|$)",
    )
    .ok()?;
    let inverse = Regex::new(
        r"(?i)\b(?:at|with)\s+([a-z0-9 .&'/()-]{2,40}?)\s+(?:for|as)\s+(?:(?:an?|the)\s+)?([a-z0-9 .+#/&-]{2,40}?)(?:\s+(?:role|position|opening))?\s*(?:[.,!;|]|$)",
    )
    .ok()?;
    let title_at = Regex::new(
        r"(?i)^\s*([a-z0-9 .+#/&-]{2,40}?)(?:\s+(?:role|position))?\s+at\s+([a-z0-9 .&'/()-]{2,40}?)\s*(?:[.,!;|]|$)",
    )
    .ok()?;

    if let Some(c) = forward.captures(original) {
        let company = c[2].trim().to_string();
        if looks_like_company(&company) {
            return Some(SentenceParts {
                company,
                role: validated_role(&c[1]),
                trailing: trailing_clause(original, c.get(0)?.end()),
            });
        }
    }

    if let Some(c) = inverse.captures(original) {
        let company = c[1].trim().to_string();
        if looks_like_company(&company) {
            return Some(SentenceParts {
                company,
                role: validated_role(&c[2]),
                trailing: trailing_clause(original, c.get(0)?.end()),
            });
        }
    }

    // "<role> at <company>" only counts when the head really is a role,
    // otherwise any "X at Y" sentence would shed its subject.
    if let Some(c) = title_at.captures(stripped) {
        let company = c[2].trim().to_string();
        if looks_like_company(&company) && looks_like_role(&c[1]) {
            return Some(SentenceParts {
                company,
                role: Some(strip_role_suffix(&c[1])),
                trailing: trailing_clause(stripped, c.get(0)?.end()),
            });
        }
    }

    None
}

fn validated_role(candidate: &str) -> Option<String> {
    let c = candidate.trim();
    if looks_like_role(c) {
        Some(strip_role_suffix(c))
    } else {
        None
    }
}

// Text after a sentence match becomes a notes source, but only when it says
// something ("HR said 12 LPA"), not a stray date word.
fn trailing_clause(text: &str, from: usize) -> Option<String> {
    let tail = text[from..].trim_matches(|c: char| c.is_whitespace() || ".,;:-".contains(c));
    if tail.split_whitespace().count() >= 3 {
        Some(tail.to_string())
    } else {
        None
    }
}

fn parse_add_application(text: &str) -> Option<String> {
    let re = Regex::new(
        r"(?i)\badd(?:ed)?\s+(?:an?\s+)?application\s+for\s+([a-z0-9 .&'/()-]{2,40}?)\s*(?:[.,!;|]|$)",
    )
    .ok()?;
    let c = re.captures(text)?;
    let company = c[1].trim().to_string();
    if looks_like_company(&company) {
        Some(company)
    } else {
        None
    }
}

// --- Role recognition ---

// Tried in order: leveled shorthands, qualified compounds, standalone titles.
const ROLE_PATTERNS: [&str; 3] = [
    r"(?i)\b(?:sde|sdet|swe|qa)\s*-?\s*[1-9]\b|\b(?:l|ic|e)[3-9]\b",
    r"(?i)\b(?:(?:senior|junior|staff|principal|lead)\s+)?(?:backend|back[- ]end|frontend|front[- ]end|full[- ]?stack|devops|dev|data|ml|ai|machine\s+learning|platform|cloud|mobile|ios|android|security|site\s+reliability|software|qa|test|product|program)\s+(?:engineer|developer|architect|scientist|analyst|manager|lead)\b",
    r"(?i)\b(?:sde|sdet|swe|software\s+engineer|product\s+manager|data\s+scientist|data\s+analyst|web\s+developer|developer|engineer)\b",
];

fn find_role_in_text(text: &str) -> Option<String> {
    for pattern in ROLE_PATTERNS {
        if let Ok(re) = Regex::new(pattern) {
            if let Some(m) = re.find(text) {
                return Some(m.as_str().trim().to_string());
            }
        }
    }
    None
}

fn looks_like_role(text: &str) -> bool {
    let t = text.trim();
    if t.is_empty() || t.split_whitespace().count() > 5 {
        return false;
    }
    if find_role_in_text(t).is_some() {
        return true;
    }
    match Regex::new(r"(?i)\b(?:role|position|opening)s?\s*$") {
        Ok(re) => re.is_match(t),
        Err(_) => false,
    }
}

fn strip_role_suffix(text: &str) -> String {
    match Regex::new(r"(?i)\s*(?:role|position|opening)s?\s*$") {
        Ok(re) => re.replace(text.trim(), "").trim().to_string(),
        Err(_) => text.trim().to_string(),
    }
}

pub fn is_generic_role(role: &str) -> bool {
    let r = role.trim().to_lowercase();
    GENERIC_ROLES.contains(&r.as_str())
}

/// Canonical casing for role labels: "sde-2" -> "SDE2", "devops" ->
/// "DevOps", "ml engineer" -> "ML Engineer", "head of product" keeps its
/// connector lowercase.
pub fn canonicalize_role(raw: &str) -> String {
    let mut text = strip_role_suffix(raw);
    if let Ok(re) = Regex::new(r"(?i)^(?:an?|the)\s+") {
        text = re.replace(&text, "").to_string();
    }

    let level = Regex::new(r"(?i)^(sde|sdet|swe|qa|l|ic|e)\s*-?\s*([0-9])$").ok();
    let tokens: Vec<String> = text
        .split_whitespace()
        .enumerate()
        .map(|(i, token)| {
            if let Some(re) = &level {
                if let Some(c) = re.captures(token) {
                    return format!("{}{}", c[1].to_uppercase(), &c[2]);
                }
            }
            let lower = token.to_lowercase();
            match lower.as_str() {
                "sde" | "sdet" | "swe" | "ml" | "ai" | "qa" => lower.to_uppercase(),
                "ios" => "iOS".to_string(),
                "dev" => "Developer".to_string(),
                "devops" => "DevOps".to_string(),
                "of" | "and" | "for" | "to" if i > 0 => lower,
                _ => title_case(token),
            }
        })
        .collect();

    tokens.join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

// --- Company sanitation ---

// Strip pipe-delimited trailers, "- Notes:" fragments, trailing status
// keywords and date words, then tidy casing. A stripped status keyword is
// kept as the entry's status.
fn clean_company(raw: &str) -> (String, Option<ApplicationStatus>) {
    let mut text = raw.split('|').next().unwrap_or("").trim().to_string();

    if let Ok(re) = Regex::new(r"(?i)\s*[-–—]?\s*\bnotes?\s*:.*$") {
        text = re.replace(&text, "").to_string();
    }

    let mut status = None;
    loop {
        let before = text.clone();

        if let Ok(re) = Regex::new(
            r"(?i)^(.*?)[\s,;-]*\b(applied|shortlisted|interview(?:ing)?|offer|rejected)\s*$",
        ) {
            if let Some(c) = re.captures(&text) {
                if !c[1].trim().is_empty() {
                    if status.is_none() {
                        status = ApplicationStatus::parse(&c[2]);
                    }
                    text = c[1].trim().to_string();
                }
            }
        }

        if let Ok(re) = Regex::new(TRAILING_DATE_PATTERN) {
            if let Some(c) = re.captures(&text) {
                if !c[1].trim().is_empty() {
                    text = c[1].trim().to_string();
                }
            }
        }

        if text == before {
            break;
        }
    }

    let text = text
        .trim_matches(|c: char| c.is_whitespace() || "-–—,.;:".contains(c))
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    (capitalize_words(&text), status)
}

// Capitalize fully lowercase words ("zee5" -> "Zee5") and leave anything
// with existing uppercase alone ("SandboxAQ", "iQ").
fn capitalize_words(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            if word.chars().any(char::is_uppercase) {
                word.to_string()
            } else {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// --- Notes ---

fn find_hr_said_clause(text: &str) -> Option<String> {
    let re = Regex::new(r"(?i)\b(?:hr|recruiter|hiring\s+manager|they)\s+(?:said|told|mentioned|quoted)\b[^|.]*").ok()?;
    re.find(text).map(|m| m.as_str().trim().to_string())
}

// "sent resume via referral" as a trailing clause is a note; "sent resume
// to Zee5" is an apply-verb phrase and is not.
fn find_sent_resume_clause(text: &str) -> Option<String> {
    let re = Regex::new(r"(?i)\b(?:sent|submitted)\s+(?:my\s+)?(?:resume|application|cv)\b[^|.]*").ok()?;
    let m = re.find(text)?;
    let verb_form = Regex::new(r"(?i)^(?:sent|submitted)\s+(?:my\s+)?(?:resume|application|cv)\s+(?:to|at)\b").ok()?;
    if verb_form.is_match(m.as_str()) {
        return None;
    }
    Some(m.as_str().trim().to_string())
}

fn merge_notes(a: String, b: String) -> String {
    let (al, bl) = (a.to_lowercase(), b.to_lowercase());
    if al.contains(&bl) {
        a
    } else if bl.contains(&al) {
        b
    } else {
        format!("{}. {}", a.trim_end_matches(['.', ' ']), b)
    }
}

fn clean_notes(raw: &str) -> String {
    let mut text = raw.trim();
    if let Some(rest) = strip_ci_prefix(text, "notes:") {
        text = rest.trim();
    }
    let text = text.trim_matches(|c: char| c.is_whitespace() || ".,;:-".contains(c));

    let words: Vec<String> = text
        .split_whitespace()
        .map(|word| match word.to_lowercase().as_str() {
            // common shorthand in Indian-market salary talk
            "lpa" if word == word.to_lowercase() => "LPA".to_string(),
            "ctc" if word == word.to_lowercase() => "CTC".to_string(),
            "hr" if word == word.to_lowercase() => "HR".to_string(),
            "asap" if word == word.to_lowercase() => "ASAP".to_string(),
            "wfh" if word == word.to_lowercase() => "WFH".to_string(),
            _ => word.to_string(),
        })
        .collect();
    let joined = words.join(" ");

    // sentence-case the first letter
    let mut chars = joined.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

// --- Dates ---

fn extract_applied_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let verb = Regex::new(r"(?i)\b(?:appl(?:y|ied|ying)|submitted|sent)\b").ok()?;
    let after = &text[verb.find(text)?.end()..];

    let expr = Regex::new(
        r"(?i)\b(?:today|tomorrow|yesterday|\d{4}-\d{2}-\d{2}|in\s+\d+\s+days?|(?:next\s+|last\s+)?(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday))\b",
    )
    .ok()?;
    parse_date_expression(expr.find(after)?.as_str(), today)
}

// --- Batch dedup and role backfill ---

// Same company mentioned twice in one batch collapses into one entry;
// first non-empty field wins, notes merge.
fn dedup_batch(apps: Vec<IntakeApplication>) -> Vec<IntakeApplication> {
    let mut out: Vec<IntakeApplication> = Vec::new();
    for app in apps {
        if let Some(existing) = out
            .iter_mut()
            .find(|e| e.company.eq_ignore_ascii_case(&app.company))
        {
            let upgrade = match (&existing.role, &app.role) {
                (None, Some(_)) => true,
                (Some(cur), Some(new)) => is_generic_role(cur) && !is_generic_role(new),
                _ => false,
            };
            if upgrade {
                existing.role = app.role;
            }
            if existing.status.is_none() {
                existing.status = app.status;
            }
            if existing.applied_on.is_none() {
                existing.applied_on = app.applied_on;
            }
            existing.notes = match (existing.notes.take(), app.notes) {
                (Some(a), Some(b)) => Some(merge_notes(a, b)),
                (a, b) => a.or(b),
            };
        } else {
            out.push(app);
        }
    }
    out
}

// With one clearly specific role in the batch, entries with a missing or
// generic role inherit it. Ambiguity (two specific roles, or several
// distinct labels) changes nothing.
fn backfill_roles(apps: &mut [IntakeApplication]) {
    if apps.len() < 2 {
        return;
    }

    let mut specific: Vec<String> = Vec::new();
    let mut any: Vec<String> = Vec::new();
    for role in apps.iter().filter_map(|a| a.role.as_ref()) {
        if !any.iter().any(|r| r.eq_ignore_ascii_case(role)) {
            any.push(role.clone());
        }
        if !is_generic_role(role) && !specific.iter().any(|r| r.eq_ignore_ascii_case(role)) {
            specific.push(role.clone());
        }
    }

    if specific.len() == 1 {
        let winner = specific.remove(0);
        for app in apps.iter_mut() {
            let replace = app.role.as_ref().is_none_or(|r| is_generic_role(r));
            if replace {
                app.role = Some(winner.clone());
            }
        }
    } else if specific.is_empty() && any.len() == 1 && apps.iter().any(|a| a.role.is_none()) {
        let only = any.remove(0);
        for app in apps.iter_mut() {
            if app.role.is_none() {
                app.role = Some(only.clone());
            }
        }
    }
}
