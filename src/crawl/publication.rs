use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

/// Hosts that serve publication records rather than tool homepages.
/// Subdomains match too.
pub const PUBLICATION_HOSTS: &[&str] = &[
    "doi.org",
    "handle.net",
    "orcid.org",
    "pubmed.ncbi.nlm.nih.gov",
    "europepmc.org",
    "link.springer.com",
    "nature.com",
    "sciencedirect.com",
    "academic.oup.com",
    "onlinelibrary.wiley.com",
    "biomedcentral.com",
    "journals.plos.org",
    "frontiersin.org",
    "researchgate.net",
    "biorxiv.org",
    "medrxiv.org",
    "ieeexplore.ieee.org",
    "dl.acm.org",
    "jamanetwork.com",
    "science.org",
    "cell.com",
    "hindawi.com",
    "tandfonline.com",
    "karger.com",
    "mdpi.com",
];

static DOI_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)/10\.[0-9]{4,9}/[-._;()/:a-z0-9]+").expect("DOI path pattern is valid")
});

/// Meta tags that journal pages carry and tool pages do not.
const CITATION_META: &[&str] = &[
    "citation_doi",
    "citation_journal_title",
    "citation_pmid",
    "citation_publisher",
];

/// True when the URL alone identifies a publication record.
pub fn is_probable_publication_url(raw: &str) -> bool {
    let Ok(url) = Url::parse(raw.trim()) else {
        return false;
    };
    let Some(host) = url.host_str().map(str::to_ascii_lowercase) else {
        return false;
    };
    let path = url.path().to_ascii_lowercase();

    if PUBLICATION_HOSTS
        .iter()
        .any(|known| host == *known || host.ends_with(&format!(".{known}")))
    {
        return true;
    }
    if host.ends_with("ncbi.nlm.nih.gov") && (path.starts_with("/pmc") || path.starts_with("/pubmed"))
    {
        return true;
    }
    DOI_PATH.is_match(&path)
}

/// True when the page is a publication, judged by URL or by citation
/// metadata in the parsed document.
pub fn classify_publication(url: &str, document: &Html) -> bool {
    if is_probable_publication_url(url) {
        return true;
    }
    let Ok(selector) = Selector::parse("meta[name]") else {
        return false;
    };
    document.select(&selector).any(|meta| {
        meta.value()
            .attr("name")
            .is_some_and(|name| CITATION_META.contains(&name.to_ascii_lowercase().as_str()))
    })
}
