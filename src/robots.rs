//! `robots.txt` carriage.
//!
//! Preferences can be attached to crawl rules in `robots.txt` with
//! `Content-Usage` lines inside a user-agent group:
//!
//! ```text
//! User-Agent: *
//! Allow: /
//! Content-Usage: tdm=y, genai=n
//! Content-Usage: /images/ genai=n, ai=n
//! ```
//!
//! A `Content-Usage` value that starts with `/` is scoped to the path pattern
//! before the first space or tab; otherwise it applies to the whole site.
//! Comments (`#` to end of line) are stripped before a value reaches the
//! preference parser. Groups are selected and `Allow`/`Disallow` rules
//! applied as RFC 9309 describes.
//!
//! # Example
//!
//! ```
//! use usage_prefs::robots::Robots;
//! use usage_prefs::{evaluate, Decision, Hierarchy, Policy};
//!
//! let robots = Robots::parse_str(
//!     "User-Agent: *\n\
//!      Disallow: /private\n\
//!      Content-Usage: tdm=y # everything\n\
//!      Content-Usage: /images/ genai=n\n",
//! );
//!
//! let hierarchy = Hierarchy::standard();
//! let policy = Policy::uniform(&hierarchy, Decision::Denied);
//!
//! assert!(robots.preferences(&hierarchy, "ExampleBot", "/private/a").is_none());
//!
//! let record = robots.preferences(&hierarchy, "ExampleBot", "/images/cat.jpg").unwrap();
//! assert_eq!(evaluate(&record, "genai", &hierarchy, &policy), Some(Decision::Denied));
//! assert_eq!(evaluate(&record, "search", &hierarchy, &policy), Some(Decision::Denied));
//!
//! let record = robots.preferences(&hierarchy, "ExampleBot", "/index.html").unwrap();
//! assert_eq!(evaluate(&record, "genai", &hierarchy, &policy), Some(Decision::Allowed));
//! ```

use std::io::{self, BufRead};

use crate::hierarchy::Hierarchy;
use crate::parser::{ParseSummary, Parser};
use crate::record::PreferenceRecord;

/// The rule name carrying preference expressions.
pub const CONTENT_USAGE: &str = "content-usage";

#[derive(Debug, Clone)]
struct AccessRule {
    pattern: String,
    allow: bool,
}

#[derive(Debug, Clone)]
struct UsageRule {
    pattern: String,
    expression: String,
}

#[derive(Debug, Clone, Default)]
struct Group {
    user_agents: Vec<String>,
    access: Vec<AccessRule>,
    usage: Vec<UsageRule>,
}

impl Group {
    fn names(&self, user_agent: &str) -> bool {
        self.user_agents
            .iter()
            .any(|ua| ua.eq_ignore_ascii_case(user_agent))
    }

    fn rule(&mut self, name: &str, value: &str) {
        if name.eq_ignore_ascii_case(CONTENT_USAGE) {
            let (pattern, expression) = if value.starts_with('/') {
                let Some((pattern, expression)) = value.split_once([' ', '\t']) else {
                    tracing::trace!(value, "content-usage rule without expression");
                    return;
                };
                (pattern, expression.trim_start_matches([' ', '\t']))
            } else {
                ("", value)
            };
            self.usage.push(UsageRule {
                pattern: pattern.to_string(),
                expression: expression.to_string(),
            });
        } else if name.eq_ignore_ascii_case("allow") {
            self.access.push(AccessRule {
                pattern: value.to_string(),
                allow: true,
            });
        } else if name.eq_ignore_ascii_case("disallow") {
            self.access.push(AccessRule {
                pattern: value.to_string(),
                allow: false,
            });
        }
    }
}

/// Groups, access rules and preference lines read from a `robots.txt` file.
#[derive(Debug, Clone, Default)]
pub struct Robots {
    groups: Vec<Group>,
}

/// Incremental line reader shared by [`Robots::parse`] and
/// [`Robots::parse_str`].
#[derive(Default)]
struct Reader {
    robots: Robots,
    current: Option<Group>,
    in_agents: bool,
}

impl Reader {
    fn line(&mut self, line: &str) {
        let line = line.split_once('#').map_or(line, |(content, _)| content);
        let Some((name, value)) = line.split_once(':') else {
            return;
        };
        let (name, value) = (name.trim_ascii(), value.trim_ascii());

        if name.eq_ignore_ascii_case("user-agent") {
            if !self.in_agents {
                self.finish_group();
                self.current = Some(Group::default());
                self.in_agents = true;
            }
            if let Some(group) = &mut self.current {
                group.user_agents.push(value.to_string());
            }
        } else {
            self.in_agents = false;
            match &mut self.current {
                Some(group) => group.rule(name, value),
                None => tracing::trace!(name, "ignoring rule outside any group"),
            }
        }
    }

    fn finish_group(&mut self) {
        if let Some(group) = self.current.take() {
            self.robots.groups.push(group);
        }
    }

    fn finish(mut self) -> Robots {
        self.finish_group();
        self.robots
    }
}

impl Robots {
    /// Reads a `robots.txt` file.
    ///
    /// Invalid UTF-8 is replaced rather than rejected; only I/O errors from
    /// `input` are reported.
    pub fn parse(mut input: impl BufRead) -> io::Result<Self> {
        let mut reader = Reader::default();
        let mut buf = Vec::new();
        while input.read_until(b'\n', &mut buf)? > 0 {
            reader.line(&String::from_utf8_lossy(&buf));
            buf.clear();
        }
        Ok(reader.finish())
    }

    /// Reads a `robots.txt` file that is already in memory.
    pub fn parse_str(text: &str) -> Self {
        let mut reader = Reader::default();
        for line in text.lines() {
            reader.line(line);
        }
        reader.finish()
    }

    /// Returns the groups that apply to `user_agent`: those naming it, or
    /// the `*` groups if none does.
    fn groups_for<'a>(&'a self, user_agent: &str) -> Vec<&'a Group> {
        let named: Vec<_> = self.groups.iter().filter(|g| g.names(user_agent)).collect();
        if named.is_empty() {
            self.groups.iter().filter(|g| g.names("*")).collect()
        } else {
            named
        }
    }

    /// Returns `true` if `user_agent` may crawl `path`.
    pub fn is_admitted(&self, user_agent: &str, path: &str) -> bool {
        admitted(&self.groups_for(user_agent), path)
    }

    /// Collects the preferences that apply to `path` for `user_agent`, parsing
    /// each `Content-Usage` line with the default budget.
    ///
    /// Returns `None` if the crawler may not fetch `path` at all. Otherwise
    /// the record merges every `Content-Usage` line whose path pattern is the
    /// longest one matching `path`.
    pub fn preferences(
        &self,
        hierarchy: &Hierarchy,
        user_agent: &str,
        path: &str,
    ) -> Option<PreferenceRecord> {
        self.preferences_with(&Parser::new(hierarchy), user_agent, path)
            .map(|(record, _)| record)
    }

    /// Like [`Robots::preferences`], but parses each `Content-Usage` line
    /// with `parser`, so its budget and interest filter apply, and also
    /// returns the accumulated parse counts.
    pub fn preferences_with(
        &self,
        parser: &Parser<'_>,
        user_agent: &str,
        path: &str,
    ) -> Option<(PreferenceRecord, ParseSummary)> {
        let groups = self.groups_for(user_agent);
        if !admitted(&groups, path) {
            tracing::debug!(user_agent, path, "path not admitted");
            return None;
        }

        let matching: Vec<_> = groups
            .iter()
            .flat_map(|g| &g.usage)
            .filter(|rule| path_matches(&rule.pattern, path))
            .collect();
        let longest = matching.iter().map(|rule| rule.pattern.len()).max();

        let hierarchy = parser.hierarchy();
        let mut record = PreferenceRecord::new(hierarchy);
        let mut summary = ParseSummary::default();
        for rule in matching
            .iter()
            .filter(|rule| Some(rule.pattern.len()) == longest)
        {
            let mut line = PreferenceRecord::new(hierarchy);
            summary += parser.parse(&rule.expression, &mut line);
            record.merge(&line);
        }
        Some((record, summary))
    }
}

/// Applies the most specific matching access rule; allow wins ties and no
/// matching rule admits.
fn admitted(groups: &[&Group], path: &str) -> bool {
    let mut best: Option<&AccessRule> = None;
    for rule in groups.iter().flat_map(|g| &g.access) {
        if rule.pattern.is_empty() || !path_matches(&rule.pattern, path) {
            continue;
        }
        let better = match best {
            None => true,
            Some(b) => {
                rule.pattern.len() > b.pattern.len()
                    || (rule.pattern.len() == b.pattern.len() && rule.allow)
            }
        };
        if better {
            best = Some(rule);
        }
    }
    best.is_none_or(|rule| rule.allow)
}

/// Matches a path against an RFC 9309 pattern: `*` matches any sequence of
/// characters and a trailing `$` anchors the end of the path.
fn path_matches(pattern: &str, path: &str) -> bool {
    let (pattern, anchored) = match pattern.strip_suffix('$') {
        Some(p) => (p, true),
        None => (pattern, false),
    };
    let mut parts = pattern.split('*');
    let first = parts.next().unwrap_or_default();
    let Some(mut rest) = path.strip_prefix(first) else {
        return false;
    };
    let parts: Vec<&str> = parts.collect();
    for (i, part) in parts.iter().enumerate() {
        if anchored && i + 1 == parts.len() {
            return rest.ends_with(part);
        }
        match rest.find(part) {
            Some(offset) => rest = &rest[offset + part.len()..],
            None => return false,
        }
    }
    !anchored || rest.is_empty()
}
