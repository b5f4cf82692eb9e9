use super::publication::classify_publication;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::{BTreeSet, HashSet};
use url::Url;

/// Terms in anchor text or href that suggest documentation, installation,
/// reproducibility or maintenance evidence.
pub const DOCUMENTATION_KEYWORDS: &[&str] = &[
    "doc",
    "docs",
    "documentation",
    "manual",
    "user manual",
    "handbook",
    "guide",
    "usage guide",
    "usage",
    "how to",
    "how-to",
    "tutorial",
    "walkthrough",
    "quickstart",
    "getting started",
    "examples",
    "example",
    "cookbook",
    "reference",
    "api reference",
    "first steps",
    "example workflow",
    "usage:",
    "--help",
    "cli",
    "gui",
    "web app",
    "rest api",
    "openapi",
    "swagger",
    "galaxy",
    "shiny",
    "streamlit",
    "install",
    "installation",
    "setup",
    "pip install",
    "conda install",
    "bioconda",
    "bioconductor",
    "cran",
    "docker",
    "dockerfile",
    "container",
    "singularity",
    "apptainer",
    "biocontainers",
    "ghcr.io",
    "quay.io",
    "requirements.txt",
    "environment.yml",
    "download",
    "binary",
    "release",
    "releases",
    "changelog",
    "version",
    "zenodo",
    "license",
    "workflow",
    "pipeline",
    "makefile",
    "test data",
    "sample dataset",
    "reproduce",
    "benchmark",
    "roadmap",
    "issue tracker",
    "news",
    "support",
    "support@",
    "help",
    "faq",
    "troubleshooting",
    "contact",
    "forum",
    "contributing",
];

/// Keywords strong enough to count inside page chrome (navbars, footers).
const STRONG_DOCUMENTATION_KEYWORDS: &[&str] = &[
    "doc",
    "docs",
    "documentation",
    "manual",
    "user manual",
    "handbook",
    "guide",
    "tutorial",
    "quickstart",
    "getting started",
    "api reference",
    "install",
    "installation",
    "faq",
];

/// Domain terms looked for in visible page text.
pub const DOMAIN_TERMS: &[&str] = &[
    "bioinformatics",
    "genome",
    "genomic",
    "genomics",
    "sequencing",
    "transcriptome",
    "transcriptomics",
    "proteome",
    "proteomics",
    "protein",
    "metabolomics",
    "metagenomics",
    "microbiome",
    "single-cell",
    "rna-seq",
    "chip-seq",
    "gene expression",
    "variant calling",
    "phylogenetic",
    "phylogeny",
    "sequence alignment",
    "read alignment",
    "dna",
    "rna",
    "fasta",
    "fastq",
    "vcf",
    "pdb",
    "molecular",
    "biomedical",
    "clinical",
    "cell",
];

pub const REPOSITORY_HOSTS: &[&str] = &[
    "github.com",
    "gitlab.com",
    "bitbucket.org",
    "codeberg.org",
    "gitee.com",
    "sourceforge.net",
    "git.sr.ht",
    "launchpad.net",
];

const LAYOUT_ELEMENTS: &[&str] = &["nav", "header", "footer", "aside"];
const LAYOUT_ATTR_KEYWORDS: &[&str] = &[
    "header",
    "footer",
    "nav",
    "menu",
    "breadcrumb",
    "sidebar",
    "toolbar",
    "pagehead",
    "site-footer",
    "site-header",
];
const LAYOUT_ANCESTOR_DEPTH: usize = 4;

/// Repository-host paths that are site chrome, not project links.
const REPO_NAV_PREFIXES: &[&str] = &[
    "/issues",
    "/pulls",
    "/pull",
    "/actions",
    "/projects",
    "/security",
    "/discussions",
    "/packages",
    "/marketplace",
    "/sponsors",
    "/network",
    "/graphs",
    "/pulse",
    "/features",
    "/pricing",
    "/login",
    "/signup",
    "/about",
    "/explore",
    "/topics",
];
const REPO_NAV_TEXT: &[&str] = &[
    "issues",
    "pull requests",
    "actions",
    "security",
    "projects",
    "insights",
    "code",
    "sponsors",
    "packages",
    "discussions",
    "marketplace",
];

const INVISIBLE_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Signals pulled out of one fetched document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageEvidence {
    pub documentation_urls: Vec<String>,
    pub repository_urls: Vec<String>,
    pub keyword_hits: BTreeSet<String>,
    /// Absolute `frame`/`iframe` sources, in document order.
    pub frame_urls: Vec<String>,
    pub is_publication: bool,
}

/// Parses fetched HTML into documentation, repository and keyword evidence.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvidenceExtractor;

impl EvidenceExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, html: &str, base: &Url) -> PageEvidence {
        let document = Html::parse_document(html);
        self.extract_document(&document, base)
    }

    pub fn extract_document(&self, document: &Html, base: &Url) -> PageEvidence {
        let mut evidence = PageEvidence {
            is_publication: classify_publication(base.as_str(), document),
            ..PageEvidence::default()
        };
        let mut seen_docs = HashSet::new();
        let mut seen_repos = HashSet::new();

        for anchor in select(document, "a[href]") {
            let Some(href) = anchor.value().attr("href").map(str::trim) else {
                continue;
            };
            if href.is_empty() || href.starts_with('#') || starts_with_ignore_case(href, "javascript:")
            {
                continue;
            }
            let Some(resolved) = resolve_http(base, href) else {
                continue;
            };
            let text = anchor_text(&anchor);

            if let Some(repo) = repository_root(&resolved)
                && seen_repos.insert(repo.clone())
            {
                evidence.repository_urls.push(repo);
            }

            if is_repo_navigation_link(&resolved, &text) {
                continue;
            }

            let matches = match_documentation_keywords(&text, href);
            if matches.is_empty() {
                continue;
            }
            evidence
                .keyword_hits
                .extend(matches.iter().map(|kw| (*kw).to_string()));

            let counts_as_docs = !in_layout_container(&anchor)
                || matches
                    .iter()
                    .any(|kw| STRONG_DOCUMENTATION_KEYWORDS.contains(kw));
            let url = resolved.to_string();
            if counts_as_docs && seen_docs.insert(url.clone()) {
                evidence.documentation_urls.push(url);
            }
        }

        let text = visible_text(document).to_lowercase();
        evidence.keyword_hits.extend(
            DOMAIN_TERMS
                .iter()
                .filter(|term| contains_word(&text, term))
                .map(|term| (*term).to_string()),
        );

        let mut seen_frames = HashSet::new();
        for frame in select(document, "frame[src], iframe[src]") {
            if let Some(src) = frame.value().attr("src")
                && let Some(url) = resolve_http(base, src.trim())
                && seen_frames.insert(url.to_string())
            {
                evidence.frame_urls.push(url.to_string());
            }
        }

        evidence
    }
}

fn select<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    Selector::parse(css)
        .map(|selector| document.select(&selector).collect())
        .unwrap_or_default()
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Resolve against `base`, keep http(s) only, drop the fragment.
fn resolve_http(base: &Url, href: &str) -> Option<Url> {
    let mut url = base.join(href).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}

fn anchor_text(anchor: &ElementRef<'_>) -> String {
    anchor
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn host_of(url: &Url) -> Option<String> {
    url.host_str().map(|host| {
        let host = host.to_ascii_lowercase();
        host.strip_prefix("www.").map(str::to_string).unwrap_or(host)
    })
}

fn is_repository_host(url: &Url) -> bool {
    host_of(url).is_some_and(|host| REPOSITORY_HOSTS.contains(&host.as_str()))
}

/// `https://github.com/org/tool/tree/main/docs` becomes
/// `https://github.com/org/tool`. Host-only links and chrome pages give
/// `None`.
fn repository_root(url: &Url) -> Option<String> {
    if !is_repository_host(url) || is_repo_chrome_path(url.path()) {
        return None;
    }
    let segments: Vec<&str> = url
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .take(2)
        .collect();
    let [owner, project] = segments.as_slice() else {
        return None;
    };
    let project = project.strip_suffix(".git").unwrap_or(*project);
    Some(format!(
        "{}://{}/{owner}/{project}",
        url.scheme(),
        url.host_str()?.to_ascii_lowercase()
    ))
}

fn is_repo_chrome_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    REPO_NAV_PREFIXES
        .iter()
        .any(|prefix| lower == *prefix || lower.starts_with(&format!("{prefix}/")))
}

fn is_repo_navigation_link(url: &Url, text: &str) -> bool {
    if !is_repository_host(url) {
        return false;
    }
    let text = text.trim().to_lowercase();
    REPO_NAV_TEXT.contains(&text.as_str()) || is_repo_chrome_path(url.path())
}

/// Keywords found in the anchor text or href, in list order.
pub fn match_documentation_keywords(text: &str, href: &str) -> Vec<&'static str> {
    let text = text.to_lowercase();
    let href = href.to_lowercase();
    DOCUMENTATION_KEYWORDS
        .iter()
        .copied()
        .filter(|kw| contains_word(&text, kw) || contains_word(&href, kw))
        .collect()
}

/// Substring match that refuses to split words: an alphanumeric edge of
/// `needle` must not touch an alphanumeric neighbour in `haystack`.
fn contains_word(haystack: &str, needle: &str) -> bool {
    let (Some(first), Some(last)) = (needle.chars().next(), needle.chars().last()) else {
        return false;
    };
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        let left_ok = !first.is_alphanumeric() || !before.is_some_and(char::is_alphanumeric);
        let right_ok = !last.is_alphanumeric() || !after.is_some_and(char::is_alphanumeric);
        left_ok && right_ok
    })
}

fn in_layout_container(anchor: &ElementRef<'_>) -> bool {
    anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .take(LAYOUT_ANCESTOR_DEPTH)
        .any(|element| {
            let value = element.value();
            if LAYOUT_ELEMENTS.contains(&value.name()) {
                return true;
            }
            ["class", "id", "role", "aria-label", "data-testid"]
                .iter()
                .filter_map(|attr| value.attr(attr))
                .any(|tokens| {
                    let tokens = tokens.to_lowercase();
                    LAYOUT_ATTR_KEYWORDS.iter().any(|kw| tokens.contains(kw))
                })
        })
}

fn visible_text(document: &Html) -> String {
    let mut out = String::new();
    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|element| INVISIBLE_ELEMENTS.contains(&element.value().name()));
        if !hidden {
            out.push_str(text);
            out.push(' ');
        }
    }
    out
}
