use std::fmt::{self, Display};

use super::toc::TableOfContents;

/// A plain-text rendering of a table of contents, one node per line.
pub struct Outline<'a> {
    toc: &'a TableOfContents,
    slug_paths: bool,
}

impl<'a> Outline<'a> {
    pub(crate) fn new(toc: &'a TableOfContents) -> Self {
        Self {
            toc,
            slug_paths: false,
        }
    }

    /// Render `<slug path>\t<name>` lines instead of an indented tree.
    pub fn with_slug_paths(self) -> Self {
        Self {
            slug_paths: true,
            ..self
        }
    }
}

impl Display for Outline<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (path, node) in self.toc.walk() {
            if self.slug_paths {
                writeln!(formatter, "{}\t{}", path.slug(), node.name)?;
                continue;
            }

            let indent = "  ".repeat(path.len().saturating_sub(1));
            let slug = path.last().unwrap_or_default();
            writeln!(formatter, "{indent}{} ({slug})", node.name)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const INPUT: &str = r#"{
        "intro": { "name": "Introduction" },
        "start": { "name": "Getting Started", "children": { "install": "Installation" } }
    }"#;

    #[test]
    fn renders_an_indented_tree() {
        let toc: TableOfContents = INPUT.parse().expect("TOC failed to parse");
        let expected = "Introduction (intro)\nGetting Started (start)\n  Installation (install)\n";

        assert_eq!(expected, toc.outline().to_string());
    }

    #[test]
    fn renders_slug_paths() {
        let toc: TableOfContents = INPUT.parse().expect("TOC failed to parse");
        let expected = "intro\tIntroduction\nstart\tGetting Started\nstart/install\tInstallation\n";

        assert_eq!(expected, toc.outline().with_slug_paths().to_string());
    }

    #[test]
    fn renders_nothing_for_an_empty_table() {
        let toc = TableOfContents::default();

        assert_eq!("", toc.outline().to_string());
    }
}
