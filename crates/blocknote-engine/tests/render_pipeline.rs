use blocknote_engine::{Command, Heading, MarkdownRenderer, PulldownMarkdown};
use pretty_assertions::assert_eq;

mod common;
use common::Harness;

#[test]
fn commit_rerenders_only_the_edited_block() {
    // Given A("hello") and B("# Title\ntext"), both rendered on open
    let mut h = Harness::open(&["hello", "# Title\ntext"]);
    assert_eq!(h.markdown.take(), vec!["hello", "# Title\ntext"]);
    let html_a = h.session.view().blocks[0].content_html.clone();

    // When B is committed with a heading and a fenced pseudo-heading
    let new_b = "## New\n```\n# not-a-heading\n```";
    h.edit(1, new_b);

    // Then the outline holds only the real heading
    assert_eq!(
        h.session.view().headings,
        vec![Heading {
            level: 2,
            text: "New".to_string(),
            block_index: 1,
        }]
    );
    // And only B went through the Markdown renderer again
    assert_eq!(h.markdown.take(), vec![new_b]);
    assert_eq!(h.session.view().blocks[0].content_html, html_a);
    assert_eq!(h.session.view().blocks[1].content_html, format!("<p>{new_b}</p>"));
}

#[test]
fn structural_changes_reuse_memoized_html() {
    let mut h = Harness::open(&["a", "b", "c"]);
    h.markdown.take();
    let c = h.id(2);

    h.send(Command::Drop { block: c, target: 0 });
    let a = h.id(1);
    h.send(Command::Delete { block: a });

    assert!(h.markdown.take().is_empty());
    let positions: Vec<usize> = h.session.view().blocks.iter().map(|b| b.position).collect();
    assert_eq!(positions, vec![0, 1]);
}

#[test]
fn undo_rerenders_restored_blocks() {
    let mut h = Harness::open(&["before"]);
    h.edit(0, "after");
    h.markdown.take();

    h.send(Command::Undo);

    assert_eq!(h.markdown.take(), vec!["before"]);
    assert_eq!(h.session.view().blocks[0].content_html, "<p>before</p>");
}

#[test]
fn headings_resume_after_closing_fence() {
    let h = Harness::open(&["# One\n```\n# Hidden\n```\n## Two", "plain", "# Three"]);
    h.markdown.take();

    let outline: Vec<(u8, &str, usize)> = h
        .session
        .view()
        .headings
        .iter()
        .map(|x| (x.level, x.text.as_str(), x.block_index))
        .collect();

    assert_eq!(outline, vec![(1, "One", 0), (2, "Two", 0), (1, "Three", 2)]);
}

#[test]
fn page_links_outline_to_blocks() {
    let h = Harness::open(&["intro", "## Details\nmore"]);
    let page = h.session.page().unwrap();

    assert!(page.main.contains(r#"id="block-1""#));
    assert!(page.main.contains("<p>## Details\nmore</p>"));
    assert!(page.sidebar.contains(r##"href="#block-1">Details</a>"##));
}

#[test]
fn template_output_escapes_heading_text() {
    let h = Harness::open(&["# <script>alert(1)</script>"]);
    let sidebar = &h.session.page().unwrap().sidebar;

    assert!(!sidebar.contains("<script>"));
    assert!(sidebar.contains("&lt;script&gt;"));
}

#[test]
fn pulldown_renders_gfm_extensions() {
    let html = PulldownMarkdown::new().render("| a |\n|---|\n| b |\n\n~~old~~\n\n- [x] done");

    assert!(html.contains("<table>"));
    assert!(html.contains("<del>old</del>"));
    assert!(html.contains("checkbox"));
}
