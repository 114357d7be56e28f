use super::*;

#[test]
fn test_insert_advances_cursor() {
    let mut buffer = TextBuffer::new();
    assert!(buffer.insert_str("ab"));
    assert!(buffer.insert_str("c"));
    assert!(!buffer.insert_str(""));
    assert_eq!(buffer.text(), "abc");
    assert_eq!(buffer.cursor(), 3);
}

#[test]
fn test_set_text_resets_cursor() {
    let mut buffer = TextBuffer::from_text("hello");
    buffer.set_cursor(99);
    assert_eq!(buffer.cursor(), 5);
    buffer.set_text("x\ny");
    assert_eq!(buffer.cursor(), 0);
    assert_eq!(buffer.len_lines(), 2);
}

#[test]
fn test_delete_backward_removes_whole_grapheme() {
    let mut buffer = TextBuffer::new();
    buffer.insert_str("ae\u{301}");
    assert_eq!(buffer.len_chars(), 3);
    assert!(buffer.delete_backward());
    assert_eq!(buffer.text(), "a");
    assert_eq!(buffer.cursor(), 1);
    assert!(buffer.delete_backward());
    assert!(!buffer.delete_backward());
}

#[test]
fn test_delete_forward_at_end_is_noop() {
    let mut buffer = TextBuffer::from_text("ab");
    assert!(buffer.delete_forward());
    assert_eq!(buffer.text(), "b");
    buffer.set_cursor(1);
    assert!(!buffer.delete_forward());
}

#[test]
fn test_cursor_line_col() {
    let mut buffer = TextBuffer::from_text("one\ntwo\n");
    buffer.set_cursor(6);
    assert_eq!(buffer.cursor_line_col(), (1, 2));
}

#[test]
fn test_line_start_and_end() {
    let mut buffer = TextBuffer::from_text("ab\r\ncd");
    buffer.set_cursor(1);
    assert!(buffer.move_line_end());
    assert_eq!(buffer.cursor(), 2);
    assert!(!buffer.move_line_end());
    assert!(buffer.move_line_start());
    assert_eq!(buffer.cursor(), 0);

    buffer.set_cursor(5);
    assert!(buffer.move_line_end());
    assert_eq!(buffer.cursor(), 6);
}

#[test]
fn test_move_left_right_over_graphemes() {
    let mut buffer = TextBuffer::from_text("e\u{301}x");
    assert!(buffer.move_right());
    assert_eq!(buffer.cursor(), 2);
    assert!(buffer.move_right());
    assert!(!buffer.move_right());
    assert!(buffer.move_left());
    assert!(buffer.move_left());
    assert_eq!(buffer.cursor(), 0);
    assert!(!buffer.move_left());
}

#[test]
fn test_backspace_over_crlf_removes_both_chars() {
    let mut buffer = TextBuffer::from_text("ab\r\ncd");
    buffer.set_cursor(4);
    assert!(buffer.delete_backward());
    assert_eq!(buffer.text(), "abcd");
    assert_eq!(buffer.cursor(), 2);

    let mut buffer = TextBuffer::from_text("a\r\nb");
    buffer.set_cursor(3);
    assert!(buffer.move_left());
    assert_eq!(buffer.cursor(), 1);
    assert!(buffer.delete_forward());
    assert_eq!(buffer.text(), "ab");
}

#[test]
fn test_backspace_over_lone_newline() {
    let mut buffer = TextBuffer::from_text("a\nb");
    buffer.set_cursor(2);
    assert!(buffer.delete_backward());
    assert_eq!(buffer.text(), "ab");
}
