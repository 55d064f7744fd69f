use devcon_term::{Attr, Char, Line};

fn line_from(s: &str) -> Line {
    let mut line = Line::new(s.chars().count(), Attr::default(), 0).unwrap();
    for (i, c) in s.chars().enumerate() {
        line.write(i, Char::from(c), 1, Attr::default(), 1, false);
    }
    line
}

fn text(line: &Line) -> String {
    line.cells()
        .iter()
        .map(|c| c.ch.resolve().first().map(|&u| char::from_u32(u).unwrap_or(' ')).unwrap_or(' '))
        .collect()
}

#[test]
fn bounds_invariant_holds_under_arbitrary_ops() {
    let mut line = line_from("ABCDEFGH");
    line.insert(2, 3, Attr::default(), 1);
    assert!(line.fill() <= line.width());
    line.delete(0, 5, Attr::default(), 2);
    assert!(line.fill() <= line.width());
    line.erase(0, line.width(), Attr::default(), 3, false);
    assert_eq!(line.fill(), 0);
    assert!(line.width() <= line.n_cells());
}

#[test]
fn reserve_grows_without_shrinking_n_cells() {
    let mut line = Line::new(5, Attr::default(), 0).unwrap();
    line.reserve(20, Attr::default(), 1, 5).unwrap();
    assert!(line.n_cells() >= 20);
    line.reserve(3, Attr::default(), 2, 3).unwrap();
    assert!(line.n_cells() >= 20, "reserve must never shrink the backing buffer");
}

#[test]
fn insert_truncates_at_right_edge() {
    let mut line = line_from("ABCD");
    line.insert(0, 10, Attr::default(), 1);
    assert_eq!(text(&line), "    ");
}

#[test]
fn delete_shifts_and_blanks_tail() {
    let mut line = line_from("ABCDE");
    line.delete(1, 2, Attr::default(), 1);
    assert_eq!(text(&line), "ADE  ");
}

#[test]
fn set_width_clamps_fill() {
    let mut line = line_from("ABCDE");
    line.set_width(2);
    assert_eq!(line.fill(), 2);
    line.set_width(5);
    assert_eq!(line.width(), 5);
}
