//! Writing a table of contents back out as JSON.

use anyhow::Context;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::io::Write;

use crate::{error::Result, model::toc::TableOfContents};

/// Pretty-print `toc` with `indent` spaces per level, followed by a trailing newline.
///
/// Key order is kept exactly and children without nested entries are written with the
/// bare string shorthand, so reloading the output yields an equal table of contents.
pub fn to_writer<W>(writer: W, toc: &TableOfContents, indent: usize) -> Result<()>
where
    W: Write,
{
    let indent = " ".repeat(indent);
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);

    toc.serialize(&mut serializer)
        .with_context(|| "Failed to serialize table of contents")?;
    serializer
        .into_inner()
        .write_all(b"\n")
        .with_context(|| "Failed to write table of contents")?;

    Ok(())
}

pub fn to_string_pretty(toc: &TableOfContents, indent: usize) -> Result<String> {
    let mut buffer = Vec::new();
    to_writer(&mut buffer, toc, indent)?;

    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    const INPUT: &str = r#"{"intro": {"name": "Introduction"}, "start": {"name": "Getting Started", "children": {"install": {"name": "Installation"}, "tour": {"name": "Tour", "children": {"cli": "CLI"}}}}}"#;

    #[test]
    fn pretty_prints_with_the_shorthand_for_leaves() {
        let toc: TableOfContents = INPUT.parse().expect("TOC failed to parse");
        let expected = r#"{
  "intro": {
    "name": "Introduction"
  },
  "start": {
    "name": "Getting Started",
    "children": {
      "install": "Installation",
      "tour": {
        "name": "Tour",
        "children": {
          "cli": "CLI"
        }
      }
    }
  }
}
"#;

        let actual = to_string_pretty(&toc, 2).expect("failed to format");

        assert_eq!(expected, actual);
    }

    #[test]
    fn respects_the_indent_width() {
        let toc: TableOfContents = r#"{"intro": {"name": "Introduction"}}"#
            .parse()
            .expect("TOC failed to parse");
        let expected = "{\n    \"intro\": {\n        \"name\": \"Introduction\"\n    }\n}\n";

        assert_eq!(expected, to_string_pretty(&toc, 4).expect("failed to format"));
    }

    #[test]
    fn reloading_formatted_output_yields_an_equal_tree() {
        let toc: TableOfContents = INPUT.parse().expect("TOC failed to parse");
        let formatted = to_string_pretty(&toc, 2).expect("failed to format");
        let reloaded: TableOfContents = formatted.parse().expect("formatted TOC failed to parse");

        assert_eq!(toc, reloaded);
        assert_eq!(formatted, to_string_pretty(&reloaded, 2).expect("failed to format"));
    }
}
