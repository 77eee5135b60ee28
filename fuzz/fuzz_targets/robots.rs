#![no_main]
use libfuzzer_sys::fuzz_target;
use usage_prefs::robots::Robots;
use usage_prefs::Hierarchy;

fuzz_target!(|data: (&[u8], &str, &str)| {
    let hierarchy = Hierarchy::standard();
    let Ok(robots) = Robots::parse(data.0) else {
        return;
    };
    let admitted = robots.is_admitted(data.1, data.2);
    let preferences = robots.preferences(&hierarchy, data.1, data.2);
    assert_eq!(admitted, preferences.is_some());
});
