//! Property checks for the rule line grammar.

use metadata::PrincipalKind;
use proptest::prelude::*;
use rules::{PrincipalRef, Rights, Rule, RuleLoader};
use test_support::TreeFixture;

fn rule() -> impl Strategy<Value = Rule> {
    (any::<bool>(), any::<bool>(), "[a-z_][a-z0-9_.-]{0,11}").prop_map(|(user, write, name)| {
        let principal = if user {
            PrincipalRef::user(name)
        } else {
            PrincipalRef::group(name)
        };
        let rights = if write { Rights::ReadWrite } else { Rights::ReadOnly };
        Rule::new(principal, rights)
    })
}

fn render(rule: &Rule, padded: bool) -> String {
    let kind = match rule.principal.kind {
        PrincipalKind::User => "u",
        PrincipalKind::Group => "g",
    };
    if padded {
        format!(" {kind} : {} : {} :", rule.rights, rule.principal.name)
    } else {
        format!("{kind}:{}:{}:", rule.rights, rule.principal.name)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn grants_are_read_in_order(rules in prop::collection::vec(rule(), 0..6), padded in any::<bool>()) {
        let tree = TreeFixture::with_entries(&["target/"]);
        let mut line: String = rules.iter().map(|rule| render(rule, padded)).collect();
        line.push_str(":target\n");

        let entries = RuleLoader::new(tree.root()).parse_str(&line).unwrap();

        prop_assert_eq!(entries.len(), 1);
        let target = tree.path("target");
        prop_assert_eq!(entries[0].path(), target.as_path());
        prop_assert_eq!(entries[0].rules(), rules.as_slice());
    }

    #[test]
    fn arbitrary_lines_never_panic(line in "[ -~]{0,64}") {
        let tree = TreeFixture::new();
        let _ = RuleLoader::new(tree.root()).parse_str(&line);
    }
}
