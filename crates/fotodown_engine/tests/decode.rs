use fotodown_engine::decode_page;
use pretty_assertions::assert_eq;

#[test]
fn charset_header_selects_latin1() {
    let page = decode_page(b"<p>Gr\xfc\xdfe aus K\xf6ln</p>", Some("text/html; charset=ISO-8859-1"));
    assert_eq!(page.text, "<p>Grüße aus Köln</p>");
    assert_eq!(page.encoding_label, "windows-1252");
    assert!(!page.had_replacements);
}

#[test]
fn quoted_charset_is_understood() {
    let page = decode_page("Seite 1 von 2".as_bytes(), Some("text/html; Charset=\"utf-8\""));
    assert_eq!(page.text, "Seite 1 von 2");
    assert_eq!(page.encoding_label, "UTF-8");
}

#[test]
fn bom_wins_over_header() {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice("Übersicht".as_bytes());
    let page = decode_page(&bytes, Some("text/html; charset=ISO-8859-1"));
    assert_eq!(page.text, "Übersicht");
    assert_eq!(page.encoding_label, "UTF-8");
}

#[test]
fn malformed_bytes_are_replaced_not_rejected() {
    let page = decode_page(b"abc \xff broken", Some("text/html; charset=utf-8"));
    assert_eq!(page.text, "abc \u{FFFD} broken");
    assert!(page.had_replacements);
}

#[test]
fn undeclared_charset_is_guessed() {
    let page = decode_page(
        b"<p>Sch\xf6ne Gr\xfc\xdfe aus M\xfcnchen und K\xf6ln</p>",
        Some("text/html"),
    );
    assert_eq!(page.text, "<p>Schöne Grüße aus München und Köln</p>");
    assert!(!page.had_replacements);
}
