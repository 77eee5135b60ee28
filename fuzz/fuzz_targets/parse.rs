//! Fuzz harness for expression parsing.
//!
//! Two arbitrary byte strings are parsed into the same record, once with the
//! default budget and once without, and through the header path. None of
//! this may panic, and merging in the second expression can never turn a
//! refused label back into an accepted one.

#![no_main]
use libfuzzer_sys::fuzz_target;
use usage_prefs::{Hierarchy, Parser, PreferenceRecord, TriState};

fuzz_target!(|data: (&[u8], &[u8])| {
    let hierarchy = Hierarchy::standard();

    let mut first = PreferenceRecord::new(&hierarchy);
    Parser::new(&hierarchy).parse(data.0, &mut first);

    let mut both = first.clone();
    Parser::new(&hierarchy)
        .with_budget(None)
        .parse(data.1, &mut both);

    for (id, state) in first.iter() {
        if state == TriState::No {
            assert_eq!(both.get(id), TriState::No);
        }
    }

    let field = String::from_utf8_lossy(data.1);
    usage_prefs::header::parse_field(&field, &mut both, &hierarchy);
});
