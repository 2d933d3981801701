use ferry_contract::check::{check_callable, check_inputs, check_outputs, check_signature};
use ferry_contract::{Candidate, ContractError, DynFn, Position, TypeTag};
use proptest::prelude::*;

fn tag() -> impl Strategy<Value = TypeTag> {
    prop_oneof![
        Just(TypeTag::of::<i64>()),
        Just(TypeTag::of::<String>()),
        Just(TypeTag::of::<bool>()),
        Just(TypeTag::of::<Vec<i64>>()),
    ]
}

fn subject() -> DynFn {
    DynFn::binary(|x: i64, s: String| i64::try_from(s.len()) == Ok(x))
}

#[test]
fn test_exact_signature_passes() {
    let candidate = Candidate::from(subject());
    let f = check_signature(
        &candidate,
        &[TypeTag::of::<i64>(), TypeTag::of::<String>()],
        &[TypeTag::of::<bool>()],
    )
    .unwrap();
    assert_eq!(f.signature().inputs().len(), 2);
}

#[test]
fn test_opaque_value_is_not_callable() {
    let err = check_callable(&Candidate::opaque("f".to_string())).unwrap_err();
    assert_eq!(
        err,
        ContractError::NotCallable {
            actual: TypeTag::of::<String>()
        }
    );
}

#[test]
fn test_sink_has_no_outputs() {
    let f = DynFn::sink(|_: i64| {});
    assert!(check_outputs(&f, &[]).is_ok());
    assert!(matches!(
        check_outputs(&f, &[TypeTag::of::<i64>()]),
        Err(ContractError::Arity { position: Position::Output, expected: 1, actual: 0 })
    ));
}

proptest! {
    #[test]
    fn prop_check_inputs_reports_first_violation(expected in prop::collection::vec(tag(), 0..4)) {
        let f = subject();
        let actual = [TypeTag::of::<i64>(), TypeTag::of::<String>()];
        match check_inputs(&f, &expected) {
            Ok(()) => prop_assert_eq!(&expected[..], &actual[..]),
            Err(ContractError::Arity { position, expected: want, actual: got }) => {
                prop_assert_eq!(position, Position::Input);
                prop_assert_eq!(want, expected.len());
                prop_assert_eq!(got, 2);
                prop_assert_ne!(expected.len(), 2);
            }
            Err(ContractError::TypeMismatch { position, index, expected: want, actual: got }) => {
                prop_assert_eq!(position, Position::Input);
                prop_assert_eq!(expected.len(), 2);
                prop_assert!(expected[..index] == actual[..index]);
                prop_assert_eq!(want, expected[index]);
                prop_assert_eq!(got, actual[index]);
                prop_assert_ne!(want, got);
            }
            Err(other) => prop_assert!(false, "unexpected error {other}"),
        }
    }

    #[test]
    fn prop_checks_never_invoke(expected in prop::collection::vec(tag(), 0..4)) {
        let f = DynFn::unary(|_: i64| -> bool { panic!("checked callable was invoked") });
        let candidate = Candidate::from(f);
        let _ = check_signature(&candidate, &expected, &expected);
    }
}
