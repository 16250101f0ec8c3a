//! Social-media profile links found in free text (usually a website field).

use std::sync::LazyLock;

use regex::Regex;

static FACEBOOK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:www\.)?facebook\.com/[a-zA-Z0-9._/-]+/?").expect("valid regex")
});
static INSTAGRAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:www\.)?instagram\.com/[a-zA-Z0-9._/-]+/?").expect("valid regex")
});
static TWITTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:www\.)?twitter\.com/[a-zA-Z0-9._/-]+/?").expect("valid regex")
});
static LINKEDIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:www\.)?linkedin\.com/in/[a-zA-Z0-9._/-]+/?").expect("valid regex")
});
static TIKTOK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:www\.)?tiktok\.com/@[a-zA-Z0-9._/-]+/?").expect("valid regex")
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SocialLinks {
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub twitter: Option<String>,
    pub linkedin: Option<String>,
    pub tiktok: Option<String>,
}

/// First link per network found in `text`.
#[must_use]
pub fn extract_social_links(text: &str) -> SocialLinks {
    let first = |re: &Regex| re.find(text).map(|m| m.as_str().to_owned());
    SocialLinks {
        facebook: first(&FACEBOOK_RE),
        instagram: first(&INSTAGRAM_RE),
        twitter: first(&TWITTER_RE),
        linkedin: first(&LINKEDIN_RE),
        tiktok: first(&TIKTOK_RE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_website_has_no_social_links() {
        assert_eq!(
            extract_social_links("https://ironfistboxing.co.uk"),
            SocialLinks::default()
        );
    }

    #[test]
    fn finds_each_network() {
        let text = "see https://www.facebook.com/ironfist and \
                    http://instagram.com/iron.fist/ plus https://twitter.com/ironfist_ni \
                    https://www.linkedin.com/in/coach-joe https://www.tiktok.com/@ironfist";
        let links = extract_social_links(text);
        assert_eq!(links.facebook.as_deref(), Some("https://www.facebook.com/ironfist"));
        assert_eq!(links.instagram.as_deref(), Some("http://instagram.com/iron.fist/"));
        assert_eq!(links.twitter.as_deref(), Some("https://twitter.com/ironfist_ni"));
        assert_eq!(links.linkedin.as_deref(), Some("https://www.linkedin.com/in/coach-joe"));
        assert_eq!(links.tiktok.as_deref(), Some("https://www.tiktok.com/@ironfist"));
    }

    #[test]
    fn linkedin_company_pages_are_not_profiles() {
        let links = extract_social_links("https://www.linkedin.com/company/ironfist");
        assert!(links.linkedin.is_none());
    }
}
