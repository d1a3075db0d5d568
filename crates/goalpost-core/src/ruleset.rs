//! Rule set configuration: loading and validation.
//!
//! A [`RuleSet`] is built once per run from a [`RuleSetConfig`] and shared
//! read-only across every page transformation. All configuration errors
//! are raised here, before any page is processed: a malformed pattern, a
//! template referencing a missing capture group, a duplicate redirect key,
//! or a non-absolute redirect path abort the whole run.

use std::collections::{BTreeMap, BTreeSet};

use eyre::{Result, WrapErr, bail};
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::redirect::RedirectTable;

/// Raw configuration as it appears in the preprocessor's config table.
///
/// Unknown keys are ignored so the table can carry host-tool entries
/// (e.g. `command`) alongside the rule set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuleSetConfig {
    /// Ordered linkifier rules, applied in declaration order.
    #[serde(default)]
    pub linkify: Vec<LinkifierConfig>,

    /// Status label to badge mapping.
    #[serde(default)]
    pub badges: BTreeMap<String, BadgeConfig>,

    /// Handle to canonical-handle mapping.
    #[serde(default)]
    pub users: BTreeMap<String, String>,

    /// Handles whose mentions are removed from output entirely.
    #[serde(default)]
    pub ignore_users: Vec<String>,

    /// Redirect entries for moved pages, `from` keys unique.
    #[serde(default)]
    pub redirect: Vec<RedirectConfig>,

    /// Fail a page on unknown badge labels instead of passing them through.
    #[serde(default)]
    pub strict_badges: bool,

    /// Site base URL, substituted for `{site}` in URL templates.
    #[serde(default)]
    pub site_url: Option<String>,

    /// Repository URL, substituted for `{repo}` in URL templates.
    #[serde(default)]
    pub repo_url: Option<String>,

    /// Template for "edit this page" links, with a `{path}` placeholder.
    #[serde(default)]
    pub edit_url_template: Option<String>,
}

/// A single pattern/template pair from configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkifierConfig {
    /// Regex with capture groups.
    pub pattern: String,
    /// URL template with `$N` placeholders (`$$` for a literal dollar).
    pub url: String,
}

/// Badge configuration: either a bare image URL, or an image plus a link
/// target the badge should point at.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BadgeConfig {
    Image(String),
    Full {
        image: String,
        #[serde(default)]
        link: Option<String>,
    },
}

/// A redirect entry from configuration; both paths are absolute site paths.
#[derive(Debug, Clone, Deserialize)]
pub struct RedirectConfig {
    pub from: String,
    pub to: String,
}

/// A compiled linkifier rule.
#[derive(Debug, Clone)]
pub struct LinkifierRule {
    pub(crate) pattern: Regex,
    pub(crate) template: String,
}

impl LinkifierRule {
    /// Compile a rule, validating that every `$N` in the template names an
    /// existing capture group.
    pub fn new(pattern: &str, template: &str) -> Result<Self> {
        let compiled = Regex::new(pattern)
            .wrap_err_with(|| format!("linkifier pattern `{pattern}` failed to compile"))?;
        let groups = compiled.captures_len() - 1;
        for group in template_group_refs(template) {
            if group == 0 || group > groups {
                bail!(
                    "linkifier template `{template}` references capture group ${group} \
                     but pattern `{pattern}` has {groups} capture group(s)"
                );
            }
        }
        Ok(LinkifierRule {
            pattern: compiled,
            template: template.to_string(),
        })
    }

    /// Expand the URL template with the groups of one match.
    pub(crate) fn expand(&self, caps: &regex::Captures<'_>) -> String {
        let template = self.template.as_bytes();
        let mut url = String::with_capacity(self.template.len());
        let mut i = 0;
        while i < template.len() {
            if template[i] == b'$' {
                if i + 1 < template.len() && template[i + 1] == b'$' {
                    url.push('$');
                    i += 2;
                    continue;
                }
                let mut j = i + 1;
                while j < template.len() && template[j].is_ascii_digit() {
                    j += 1;
                }
                if j > i + 1 {
                    // Digit runs too large for usize are kept literal,
                    // matching the load-time validation.
                    match self.template[i + 1..j].parse::<usize>() {
                        Ok(group) => {
                            if let Some(m) = caps.get(group) {
                                url.push_str(m.as_str());
                            }
                        }
                        Err(_) => url.push_str(&self.template[i..j]),
                    }
                    i = j;
                    continue;
                }
            }
            // Templates are validated UTF-8; copy the full character.
            let ch = self.template[i..].chars().next().expect("in-bounds char");
            url.push(ch);
            i += ch.len_utf8();
        }
        url
    }
}

/// Collect every `$N` group reference in a template.
fn template_group_refs(template: &str) -> Vec<usize> {
    let bytes = template.as_bytes();
    let mut refs = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' {
            if i + 1 < bytes.len() && bytes[i + 1] == b'$' {
                i += 2;
                continue;
            }
            let mut j = i + 1;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            if j > i + 1 {
                if let Ok(group) = template[i + 1..j].parse() {
                    refs.push(group);
                }
            }
            i = j.max(i + 1);
        } else {
            i += 1;
        }
    }
    refs
}

/// A resolved badge: image URL plus optional link target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub image: String,
    pub link: Option<String>,
}

impl Badge {
    /// Render the badge as inline markup for a recognized label.
    pub(crate) fn render(&self, label: &str) -> String {
        match &self.link {
            Some(link) => format!("[![{label}]({image})]({link})", image = self.image),
            None => format!("![{label}]({image})", image = self.image),
        }
    }
}

/// Auxiliary site metadata used to absolutize URL templates.
#[derive(Debug, Clone, Default)]
pub struct SiteInfo {
    pub site_url: Option<String>,
    pub repo_url: Option<String>,
    pub edit_url_template: Option<String>,
}

/// The immutable rule set shared across all page transformations.
#[derive(Debug)]
pub struct RuleSet {
    pub(crate) linkifiers: Vec<LinkifierRule>,
    pub(crate) badges: BTreeMap<String, Badge>,
    pub(crate) users: BTreeMap<String, String>,
    pub(crate) ignore_users: BTreeSet<String>,
    pub(crate) strict_badges: bool,
    pub redirects: RedirectTable,
    pub site: SiteInfo,
}

impl RuleSet {
    /// Validate a raw configuration into a rule set.
    ///
    /// Any error here is a configuration error: the caller is expected to
    /// abort before processing a single page.
    pub fn from_config(config: RuleSetConfig) -> Result<Self> {
        let site = SiteInfo {
            site_url: config.site_url,
            repo_url: config.repo_url,
            edit_url_template: config.edit_url_template,
        };

        let mut linkifiers = Vec::with_capacity(config.linkify.len());
        for rule in &config.linkify {
            let template = expand_site_placeholders(&rule.url, &site)
                .wrap_err_with(|| format!("in linkifier rule for pattern `{}`", rule.pattern))?;
            linkifiers.push(LinkifierRule::new(&rule.pattern, &template)?);
        }

        let mut badges = BTreeMap::new();
        for (label, badge) in config.badges {
            let badge = match badge {
                BadgeConfig::Image(image) => Badge {
                    image: expand_site_placeholders(&image, &site)
                        .wrap_err_with(|| format!("in badge `{label}`"))?,
                    link: None,
                },
                BadgeConfig::Full { image, link } => Badge {
                    image: expand_site_placeholders(&image, &site)
                        .wrap_err_with(|| format!("in badge `{label}`"))?,
                    link: link
                        .map(|l| expand_site_placeholders(&l, &site))
                        .transpose()
                        .wrap_err_with(|| format!("in badge `{label}`"))?,
                },
            };
            badges.insert(label, badge);
        }

        let redirects =
            RedirectTable::from_entries(config.redirect.into_iter().map(|r| (r.from, r.to)))?;

        debug!(
            linkifiers = linkifiers.len(),
            badges = badges.len(),
            users = config.users.len(),
            redirects = redirects.len(),
            "rule set loaded"
        );

        Ok(RuleSet {
            linkifiers,
            badges,
            users: config.users,
            ignore_users: config.ignore_users.into_iter().collect(),
            strict_badges: config.strict_badges,
            redirects,
            site,
        })
    }

    /// Parse and validate a rule set from a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: RuleSetConfig =
            serde_json::from_str(json).wrap_err("failed to parse rule set configuration")?;
        Self::from_config(config)
    }

    /// The "edit this page" URL for a source path, when configured.
    pub fn edit_url(&self, path: &str) -> Option<String> {
        self.site
            .edit_url_template
            .as_ref()
            .map(|template| template.replace("{path}", path))
    }

    pub fn linkifiers(&self) -> &[LinkifierRule] {
        &self.linkifiers
    }
}

/// Substitute `{site}` and `{repo}` placeholders from site metadata.
///
/// Using a placeholder without the corresponding metadata configured is a
/// configuration error.
fn expand_site_placeholders(template: &str, site: &SiteInfo) -> Result<String> {
    let mut result = template.to_string();
    if result.contains("{site}") {
        match &site.site_url {
            Some(url) => result = result.replace("{site}", url.trim_end_matches('/')),
            None => bail!("URL template `{template}` uses {{site}} but no site-url is configured"),
        }
    }
    if result.contains("{repo}") {
        match &site.repo_url {
            Some(url) => result = result.replace("{repo}", url.trim_end_matches('/')),
            None => bail!("URL template `{template}` uses {{repo}} but no repo-url is configured"),
        }
    }
    Ok(result)
}
