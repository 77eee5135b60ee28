use usage_prefs::header::{expression_from_field, parse_field};
use usage_prefs::robots::Robots;
use usage_prefs::{evaluate, parse, Decision, Hierarchy, Policy, PreferenceRecord};

const ROBOTS: &str = "\
# Preferences for all crawlers
User-Agent: *
Allow: /
Disallow: /drafts/
Content-Usage: tdm=y, ai=n
Content-Usage: /gallery/ tdm=y, genai=n, search=y

User-Agent: ArchiveBot
Disallow: /
";

#[test]
fn test_robots_end_to_end() {
    let h = Hierarchy::standard();
    let policy = Policy::uniform(&h, Decision::Denied);
    let robots = Robots::parse(ROBOTS.as_bytes()).unwrap();

    let r = robots.preferences(&h, "SearchBot", "/articles/1").unwrap();
    assert_eq!(evaluate(&r, "search", &h, &policy), Some(Decision::Allowed));
    assert_eq!(evaluate(&r, "genai", &h, &policy), Some(Decision::Denied));

    // The path-specific line replaces the site-wide one.
    let r = robots.preferences(&h, "SearchBot", "/gallery/cat.png").unwrap();
    assert_eq!(evaluate(&r, "ai", &h, &policy), Some(Decision::Allowed));
    assert_eq!(evaluate(&r, "genai", &h, &policy), Some(Decision::Denied));

    assert!(robots.preferences(&h, "SearchBot", "/drafts/x").is_none());
    assert!(robots.preferences(&h, "archivebot", "/articles/1").is_none());
}

#[test]
fn test_header_end_to_end() {
    let h = Hierarchy::standard();
    let policy = Policy::uniform(&h, Decision::Allowed);
    let mut r = PreferenceRecord::new(&h);
    parse_field("tdm=y, genai=n, ai=?1", &mut r, &h);

    assert_eq!(evaluate(&r, "ai", &h, &policy), Some(Decision::Allowed));
    assert_eq!(evaluate(&r, "genai", &h, &policy), Some(Decision::Denied));
}

#[test]
fn test_header_matches_plain_expression() {
    let h = Hierarchy::standard();
    let field = "tdm=y, ai=n, search=y";

    let mut from_header = PreferenceRecord::new(&h);
    parse_field(field, &mut from_header, &h);
    let mut from_expr = PreferenceRecord::new(&h);
    parse(field, &mut from_expr, &h, None);

    assert_eq!(from_header, from_expr);
    assert_eq!(expression_from_field(field), "tdm=y,ai=n,search=y");
}

#[test]
fn test_sources_combine() {
    let h = Hierarchy::standard();
    let policy = Policy::uniform(&h, Decision::Allowed);
    let robots = Robots::parse_str(ROBOTS);

    let mut r = robots
        .preferences(&h, "SearchBot", "/gallery/cat.png")
        .unwrap();
    assert_eq!(evaluate(&r, "search", &h, &policy), Some(Decision::Allowed));

    // A refusal in the response header outweighs the robots.txt permission.
    parse_field("search=n", &mut r, &h);
    assert_eq!(evaluate(&r, "search", &h, &policy), Some(Decision::Denied));
}
