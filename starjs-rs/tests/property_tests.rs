use proptest::prelude::*;
use starlark::environment::Module;
use starjs::{Bridge, Gateway, HostValue, Outcome};

/// Host values built from the shapes that survive a round trip exactly:
/// null, booleans, safe integers, finite fractions, strings, arrays and
/// objects with distinct keys.
fn host_value() -> impl Strategy<Value = HostValue> {
    let leaf = prop_oneof![
        Just(HostValue::Null),
        any::<bool>().prop_map(HostValue::Bool),
        (-(1i64 << 53)..(1i64 << 53)).prop_map(|n| HostValue::Number(n as f64)),
        (-1.0e9f64..1.0e9)
            .prop_filter("fractional", |f| f.fract() != 0.0)
            .prop_map(HostValue::Number),
        "\\PC{0,12}".prop_map(HostValue::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(HostValue::Array),
            prop::collection::btree_map("[a-zA-Z_]{1,8}", inner, 0..6)
                .prop_map(|m| HostValue::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    /// host → Starlark → host is the identity on round-trippable values.
    #[test]
    fn bridge_roundtrip(v in host_value()) {
        let bridge = Bridge::default();
        let module = Module::new();
        let sv = bridge.to_starlark(&v, module.heap());
        prop_assert_eq!(bridge.to_host(sv), v);
    }
}

proptest! {
    /// Integrality alone decides int vs float.
    #[test]
    fn numeric_branch(n in -1.0e12f64..1.0e12) {
        let module = Module::new();
        let sv = Bridge::default().to_starlark(&HostValue::Number(n), module.heap());
        let expected = if n == n.trunc() { "int" } else { "float" };
        prop_assert_eq!(sv.get_type(), expected);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A Starlark identity function hands back exactly what it was given.
    #[test]
    fn gateway_identity(v in host_value()) {
        let src = HostValue::String("def main(x):\n    return x\n".into());
        let outcome = Gateway::default().run(vec![src, HostValue::Null, v.clone()]);
        match outcome {
            Outcome::Success(ok) => {
                prop_assert_eq!(ok.return_value, v);
                prop_assert_eq!(ok.message, "");
            }
            Outcome::Failure { error } => prop_assert!(false, "unexpected failure: {}", error),
        }
    }
}

proptest! {
    /// The envelope always has exactly one of `error` or `returnValue`.
    #[test]
    fn envelope_is_exclusive(src in "\\PC{0,40}", name in "[a-z]{0,6}") {
        let outcome = Gateway::default().run(vec![HostValue::String(src), HostValue::String(name)]);
        let host = outcome.to_host();
        prop_assert!(host.get("error").is_some() != host.get("returnValue").is_some());
        prop_assert_eq!(host.get("message").is_some(), host.get("returnValue").is_some());
    }
}
