#![allow(non_snake_case)]

use super::*;

const CATALOG: &str = r#"# French translations
msgid ""
msgstr ""
"Language: fr-FR\n"
"Content-Type: text/plain; charset=UTF-8\n"

#: app/index.js:3
msgid "Hello"
msgstr "Bonjour"

msgctxt "menu"
msgid "Open"
msgstr "Ouvrir"

msgid ""
"Long "
"message"
msgstr "Message "
"long"

msgid "One step"
msgid_plural "%d steps"
msgstr[0] "Un pas"
msgstr[1] "%d pas"

#~ msgid "Gone"
#~ msgstr "Parti"
"#;

#[test]
fn parse___catalog___entries_in_order() {
    let entries = parse(CATALOG).unwrap();

    assert_eq!(entries.len(), 5);
    assert!(entries[0].is_header());
    assert_eq!(entries[1].id, "Hello");
    assert_eq!(entries[1].translation(), Some("Bonjour"));
    assert_eq!(entries[2].key(), "menu\u{4}Open");
    assert_eq!(entries[3].id, "Long message");
    assert_eq!(entries[3].translation(), Some("Message long"));
    assert_eq!(entries[4].plural.as_deref(), Some("%d steps"));
    assert_eq!(entries[4].strings, ["Un pas", "%d pas"]);
}

#[test]
fn parse___escapes___decoded() {
    let entries = parse(r#"msgid "a\tb"
msgstr "line\nnext \"quoted\" \\"
"#)
    .unwrap();

    assert_eq!(entries[0].id, "a\tb");
    assert_eq!(entries[0].translation(), Some("line\nnext \"quoted\" \\"));
}

#[test]
fn parse___empty_input___no_entries() {
    assert!(parse("").unwrap().is_empty());
    assert!(parse("# only a comment\n").unwrap().is_empty());
}

#[test]
fn parse___unterminated_string___error_with_line() {
    let err = parse("msgid \"Hello\"\nmsgstr \"Bonjour\n").unwrap_err();

    assert_eq!(err.line, 2);
}

#[test]
fn parse___msgstr_without_msgid___error() {
    let err = parse("msgstr \"orphan\"\n").unwrap_err();

    assert!(err.message.contains("without msgid"));
}

#[test]
fn parse___unknown_keyword___error() {
    assert!(parse("msgfoo \"x\"\n").is_err());
}

#[test]
fn parse___dangling_msgid___error() {
    assert!(parse("msgid \"a\"\nmsgstr \"b\"\nmsgid \"c\"\n").is_err());
}

#[test]
fn parse___continuation_without_keyword___error() {
    let err = parse("\"floating\"\n").unwrap_err();

    assert_eq!(err.line, 1);
}
