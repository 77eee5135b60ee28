#![no_main]
use libfuzzer_sys::fuzz_target;
use usage_prefs::{evaluate, parse, Decision, Hierarchy, Policy, PreferenceRecord};

fuzz_target!(|data: (&[u8], &[u8])| {
    let hierarchy = Hierarchy::standard();
    let policy = Policy::uniform(&hierarchy, Decision::Allowed);

    let mut record = PreferenceRecord::new(&hierarchy);
    parse(data.0, &mut record, &hierarchy, None);

    let usage = String::from_utf8_lossy(data.1);
    let decision = evaluate(&record, &usage, &hierarchy, &policy);
    assert_eq!(decision.is_some(), hierarchy.is_known(&usage));
});
