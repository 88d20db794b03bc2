use dom_hooks::{SeededUnitSource, UnitSource, short_id_with};
use proptest::prelude::*;
use proptest::test_runner::{FileFailurePersistence, TestCaseResult};

const ID_PROPTEST_REGRESSION_FILE: &str = "tests/proptest-regressions/id_property_fuzz_test.txt";
const DEFAULT_ID_PROPTEST_CASES: u32 = 256;

fn id_proptest_cases() -> u32 {
    std::env::var("DOM_HOOKS_PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_ID_PROPTEST_CASES)
}

struct ScriptedSource(f64);

impl UnitSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        self.0
    }
}

fn assert_is_four_lowercase_hex(id: &str) -> TestCaseResult {
    prop_assert_eq!(id.len(), 4, "unexpected length for {:?}", id);
    prop_assert!(
        id.chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()),
        "unexpected character in {:?}",
        id
    );
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: id_proptest_cases(),
        failure_persistence: Some(Box::new(
            FileFailurePersistence::Direct(ID_PROPTEST_REGRESSION_FILE),
        )),
        .. ProptestConfig::default()
    })]

    #[test]
    fn any_unit_draw_renders_four_hex_chars(r in 0.0f64..1.0) {
        let id = short_id_with(&mut ScriptedSource(r));
        assert_is_four_lowercase_hex(&id)?;
    }

    #[test]
    fn seeded_ids_are_well_formed(seed in any::<u64>(), count in 1usize..=64) {
        let mut source = SeededUnitSource::new(seed);
        for _ in 0..count {
            let id = short_id_with(&mut source);
            assert_is_four_lowercase_hex(&id)?;
        }
    }

    #[test]
    fn equal_seeds_yield_equal_id_sequences(seed in any::<u64>(), count in 1usize..=64) {
        let mut a = SeededUnitSource::new(seed);
        let mut b = SeededUnitSource::new(seed);

        for _ in 0..count {
            prop_assert_eq!(short_id_with(&mut a), short_id_with(&mut b));
        }
    }

    #[test]
    fn reseeding_repeats_the_sequence(seed in any::<u64>(), count in 1usize..=64) {
        let mut source = SeededUnitSource::new(seed);
        let first: Vec<String> = (0..count).map(|_| short_id_with(&mut source)).collect();

        source.reseed(seed);
        let second: Vec<String> = (0..count).map(|_| short_id_with(&mut source)).collect();

        prop_assert_eq!(first, second);
    }
}
