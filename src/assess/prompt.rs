use crate::candidate::Candidate;
use crate::crawl::EvidenceBundle;

/// Marker that opens the repair section appended by [`PromptBuilder::augment`].
pub const REPAIR_MARKER: &str = "### SCHEMA REPAIR";

/// Longest previous response echoed back in a repair prompt.
const MAX_ECHOED_RESPONSE_CHARS: usize = 4_000;

pub const DEFAULT_TEMPLATE: &str = r#"You are assessing whether a software resource belongs in bio.tools, the registry of software for the life sciences.

Material collected for this resource:

Title: {title}
Description: {description}
Homepage: {homepage}
Homepage status: {homepage_status}
Homepage error: {homepage_error}
Documentation links: {documentation}
Documentation keywords found on homepage: {documentation_keywords}
Repository: {repository}
Tags: {tags}
Published: {published_at}
Publication abstract: {publication_abstract}
Publication full text: {publication_full_text}
Known publication identifiers: {publication_ids}

Keywords and tags above were mined automatically from pages whose text is not included here. Treat them as secondary hints and cite them as "keyword evidence" when you rely on them.

Score every subcriterion with exactly one of 0, 0.5 or 1, using only the material above. Do not invent facts or URLs. If the resource is not life-science software, set all of A1-A5 to 0 and say why.

Bio relevance
A1 Biological intent stated (an explicit life-science task or domain).
A2 Operations on biological data described.
A3 Biological data input/output: 0 none, 0.5 generic only, 1 concrete formats named.
A4 Modality clearly identifiable (database portal, desktop or web application, web API or service, SPARQL endpoint, command-line tool, workbench, suite, plug-in, workflow, library, ontology) with minimal usage context.
A5 Evidence of biological use (examples on real data, or a peer-reviewed or benchmark citation).

Documentation quality
B1 Documentation completeness (manual, guide, readthedocs).
B2 Execution path: installation or setup instructions, container, package, or a hosted service to run.
B3 Reproducibility anchors (DOI, versioned release, tag, changelog).
B4 Maintenance signal (commits, issue tracker, news).
B5 Onboarding and support (quickstart, tutorial, contact, FAQ).

For any subcriterion scored 0 for lack of evidence, write "insufficient evidence: <item>" in the rationale.
Write publication identifiers as DOI:..., PMID:... or PMCID:... and list each once.
Use "" for unknown strings and [] when no identifiers are known. Numbers must be numbers, not strings.

Respond with a single JSON object and nothing else, shaped exactly as:
{
  "tool_name": "<display name>",
  "homepage": "<best homepage URL or empty>",
  "publication_ids": ["DOI:...", "PMID:...", "PMCID:..."],
  "bio_subscores": {"A1": 0, "A2": 0, "A3": 0, "A4": 0, "A5": 0},
  "documentation_subscores": {"B1": 0, "B2": 0, "B3": 0, "B4": 0, "B5": 0},
  "concise_description": "<one or two sentence summary>",
  "rationale": "<two to five sentences citing evidence and its source: homepage, documentation, repository, abstract, full_text or tags>",
  "confidence_score": 0.0
}"#;

/// Renders scoring prompts and schema-repair follow-ups.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    template: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(None)
    }
}

impl PromptBuilder {
    /// `template` overrides the built-in prompt. Unknown placeholders are
    /// left as written.
    pub fn new(template: Option<&str>) -> Self {
        Self {
            template: template
                .filter(|t| !t.trim().is_empty())
                .unwrap_or(DEFAULT_TEMPLATE)
                .to_string(),
        }
    }

    pub fn build(&self, candidate: &Candidate, evidence: &EvidenceBundle) -> String {
        let homepage = candidate
            .homepage
            .clone()
            .or_else(|| evidence.homepage_url.clone())
            .unwrap_or_default();
        let ids: Vec<String> = candidate
            .publication_identifiers()
            .iter()
            .map(ToString::to_string)
            .collect();
        let keywords: Vec<&str> = evidence.keyword_hits.iter().map(String::as_str).collect();

        let fields: [(&str, String); 13] = [
            ("title", or_none(&candidate.title)),
            ("description", or_none(&candidate.description)),
            ("homepage", or_none(&homepage)),
            ("homepage_status", evidence.homepage_status.to_string()),
            (
                "homepage_error",
                or_none(evidence.homepage_error.as_deref().unwrap_or_default()),
            ),
            ("documentation", join_or_none(&candidate.documentation)),
            ("documentation_keywords", join_or_none(&keywords)),
            ("repository", join_or_none(&candidate.repository)),
            ("tags", join_or_none(&candidate.tags)),
            (
                "published_at",
                or_none(candidate.published_at.as_deref().unwrap_or_default()),
            ),
            (
                "publication_abstract",
                or_none(candidate.publication_abstract.as_deref().unwrap_or_default()),
            ),
            (
                "publication_full_text",
                or_none(candidate.publication_full_text.as_deref().unwrap_or_default()),
            ),
            ("publication_ids", join_or_none(&ids)),
        ];

        render(&self.template, &fields)
    }

    /// Previous prompt plus a repair section quoting `violations` verbatim.
    /// An earlier repair section is replaced, not stacked.
    pub fn augment(
        &self,
        previous_prompt: &str,
        violations: &[String],
        previous_response: Option<&str>,
    ) -> String {
        let base = previous_prompt
            .find(REPAIR_MARKER)
            .map_or(previous_prompt, |idx| previous_prompt[..idx].trim_end());

        let mut prompt = String::with_capacity(base.len() + 512);
        prompt.push_str(base);
        prompt.push_str("\n\n");
        prompt.push_str(REPAIR_MARKER);
        prompt.push_str(
            "\nYour previous answer did not match the required JSON shape. \
             Problems found:\n",
        );
        for violation in violations {
            prompt.push_str("- ");
            prompt.push_str(violation);
            prompt.push('\n');
        }
        if let Some(response) = previous_response.map(str::trim).filter(|r| !r.is_empty()) {
            let echoed: String = response.chars().take(MAX_ECHOED_RESPONSE_CHARS).collect();
            prompt.push_str("\nYour previous answer was:\n");
            prompt.push_str(&echoed);
            prompt.push('\n');
        }
        prompt.push_str(
            "\nCorrect exactly the fields listed above and keep every other field \
             as it was. Respond with the complete JSON object only.",
        );
        prompt
    }
}

/// Substitutes `{name}` placeholders in one pass over the template. Values
/// are never rescanned and unknown braces are copied through.
fn render(template: &str, fields: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            fields
                .iter()
                .find(|(field, _)| *field == name)
                .map(|(_, value)| (value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn or_none(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        "None".to_string()
    } else {
        trimmed.to_string()
    }
}

fn join_or_none<S: AsRef<str>>(values: &[S]) -> String {
    let parts: Vec<&str> = values
        .iter()
        .map(|v| v.as_ref().trim())
        .filter(|v| !v.is_empty())
        .collect();
    if parts.is_empty() {
        "None".to_string()
    } else {
        parts.join(", ")
    }
}
