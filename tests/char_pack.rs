use devcon_term::Char;

#[test]
fn pack_boundary_is_four_code_points() {
    let mut ch = Char::from('a');
    for _ in 0..2 {
        ch = Char::merge(ch, 0x0301);
    }
    assert!(!ch.is_allocated(), "3 code points should stay packed");
    ch = Char::merge(ch, 0x0302);
    assert!(ch.is_allocated(), "4th code point should promote to boxed");
}

#[test]
fn dup_produces_independent_storage() {
    let base = Char::merge(Char::merge(Char::merge(Char::from('a'), 1), 2), 3);
    let copy = base.dup();
    assert!(base.is_allocated());
    assert!(base.equal(&copy));
    assert!(!base.same(&copy), "boxed dup must not share backing storage");
}

#[test]
fn resolve_returns_terminal_sequence() {
    let mut ch = Char::from('x');
    let marks = [0x0300u32, 0x0301, 0x0302, 0x0303, 0x0304];
    for m in marks {
        ch = Char::merge(ch, m);
    }
    let mut expected = vec!['x' as u32];
    expected.extend_from_slice(&marks);
    assert_eq!(ch.resolve(), expected.as_slice());
}
