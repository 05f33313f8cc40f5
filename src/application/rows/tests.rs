use crate::application::rows::{build_rows, group_connectors};
use crate::domain::*;
use crate::infra::diff::{parse_unified_diff, split_lines};

fn single_file(diff: &str) -> DiffFile {
    parse_unified_diff(diff).files.into_iter().next().unwrap()
}

fn numbered(prefix: &str, count: u32) -> Vec<String> {
    (1..=count).map(|n| format!("{prefix}{n}")).collect()
}

fn kinds(model: &RowModel) -> Vec<ConnectorKind> {
    model.connectors().iter().map(|c| c.kind).collect()
}

#[test]
fn removed_then_added_becomes_one_change_row() {
    let file = single_file("diff --git a/a.txt b/a.txt\n@@ -1,2 +1,2 @@\n-hello\n+hello world\n keep");
    let model = build_rows(&file, None, None);

    assert_eq!(model.len(), 2);
    let row = &model.rows()[0];
    assert!(matches!(row.left(), Cell::Change { line: 1, .. }));
    assert!(matches!(row.right(), Cell::Change { line: 1, .. }));
    if let Cell::Change { segments, .. } = row.right() {
        assert_eq!(segments.before, "hello");
        assert_eq!(segments.changed, " world");
    }

    assert_eq!(model.connectors().len(), 1);
    let connector = &model.connectors()[0];
    assert_eq!(connector.kind, ConnectorKind::Change);
    assert_eq!(connector.rows(), 0..=0);
    assert_eq!(connector.anchor, None);
}

#[test]
fn added_then_removed_is_also_paired() {
    let file = single_file("diff --git a/f b/f\n@@ -1,1 +1,1 @@\n+new\n-old\n");
    let model = build_rows(&file, None, None);
    assert_eq!(model.len(), 1);
    assert_eq!(model.rows()[0].left().content(), Some("old"));
    assert_eq!(model.rows()[0].right().content(), Some("new"));
    assert_eq!(kinds(&model), vec![ConnectorKind::Change]);
}

#[test]
fn unmatched_lines_get_spacers_and_anchored_connectors() {
    let diff = "\
diff --git a/f b/f
@@ -1,4 +1,4 @@
 a
-b
-c
 d
+e
+f
";
    let model = build_rows(&single_file(diff), None, None);
    assert_eq!(model.len(), 6);

    let removed = &model.rows()[1];
    assert!(matches!(removed.left(), Cell::Removed { line: 2, .. }));
    assert!(removed.right().is_spacer());

    let added = &model.rows()[4];
    assert!(added.left().is_spacer());
    assert!(matches!(added.right(), Cell::Added { line: 3, .. }));

    let connectors = model.connectors();
    assert_eq!(connectors.len(), 2);
    assert_eq!(connectors[0].kind, ConnectorKind::Removed);
    assert_eq!(connectors[0].rows(), 1..=2);
    assert_eq!(connectors[0].anchor, Some(1));
    assert_eq!(connectors[1].kind, ConnectorKind::Added);
    assert_eq!(connectors[1].rows(), 4..=5);
    assert_eq!(connectors[1].anchor, Some(4));
    assert_eq!(connectors[1].first_row, RowId { old: None, new: Some(3) });
    assert_eq!(connectors[1].last_row, RowId { old: None, new: Some(4) });
}

#[test]
fn five_added_lines_form_one_connector() {
    let diff = "diff --git a/f b/f\n@@ -1,1 +1,6 @@\n a\n+1\n+2\n+3\n+4\n+5\n";
    let model = build_rows(&single_file(diff), None, None);
    assert_eq!(model.connectors().len(), 1);
    assert_eq!(model.connectors()[0].row_count(), 5);
    assert_eq!(model.connectors()[0].anchor, Some(1));
}

#[test]
fn mixed_run_pairs_sequentially() {
    let diff = "diff --git a/f b/f\n@@ -1,2 +1,2 @@\n-a\n-b\n+c\n+d\n";
    let model = build_rows(&single_file(diff), None, None);
    assert_eq!(model.len(), 3);
    assert_eq!(
        kinds(&model),
        vec![ConnectorKind::Removed, ConnectorKind::Change, ConnectorKind::Added]
    );
    assert_eq!(model.connectors()[2].anchor, Some(2));
}

#[test]
fn gap_rows_fill_from_full_contents() {
    let old = numbered("line", 12);
    let mut new = old.clone();
    new[9] = "changed".to_string();
    let diff = "diff --git a/f b/f\n@@ -10,1 +10,1 @@\n-line10\n+changed\n";
    let model = build_rows(&single_file(diff), Some(old.as_slice()), Some(new.as_slice()));

    assert_eq!(model.len(), 12);
    for (index, row) in model.rows()[..9].iter().enumerate() {
        let line = index as u32 + 1;
        assert!(matches!(row.left(), Cell::Context { line: l, .. } if *l == line));
        assert!(matches!(row.right(), Cell::Context { line: l, .. } if *l == line));
        assert_eq!(row.left().content(), Some(old[index].as_str()));
    }
    assert!(matches!(model.rows()[9].left(), Cell::Change { line: 10, .. }));
    assert!(matches!(model.rows()[11].right(), Cell::Context { line: 12, .. }));
    assert_eq!(model.connectors()[0].rows(), 9..=9);
}

#[test]
fn full_contents_cover_every_line_on_each_side() {
    let old_text = "a\nb\nc\nd\ne\nf\ng\nh\n";
    let new_text = "a\nB\nc\nd\ne\nf\ng\nh\ni\nj\n";
    let diff = "\
diff --git a/f b/f
--- a/f
+++ b/f
@@ -1,3 +1,3 @@
 a
-b
+B
 c
@@ -7,2 +7,4 @@
 g
 h
+i
+j
";
    let old = split_lines(old_text);
    let new = split_lines(new_text);
    let model = build_rows(&single_file(diff), Some(old.as_slice()), Some(new.as_slice()));

    assert_eq!(model.real_rows(Side::Left), old.len());
    assert_eq!(model.real_rows(Side::Right), new.len());
    assert_eq!(model.len(), 10);

    let ids: std::collections::HashSet<RowId> = model.rows().iter().map(VisualRow::id).collect();
    assert_eq!(ids.len(), model.len());
}

#[test]
fn insertion_after_gap_anchors_to_last_gap_line() {
    let old = numbered("l", 5);
    let mut new = old.clone();
    new.insert(4, "inserted".to_string());
    let diff = "diff --git a/f b/f\n@@ -4,0 +5,1 @@\n+inserted\n";
    let model = build_rows(&single_file(diff), Some(old.as_slice()), Some(new.as_slice()));

    assert_eq!(model.len(), 6);
    let connector = &model.connectors()[0];
    assert_eq!(connector.kind, ConnectorKind::Added);
    assert_eq!(connector.anchor, Some(4));
    assert_eq!(connector.first_index, 4);
    assert!(matches!(model.rows()[5].left(), Cell::Context { line: 5, .. }));
    assert!(matches!(model.rows()[5].right(), Cell::Context { line: 6, .. }));
}

#[test]
fn new_file_with_empty_old_side() {
    let new = numbered("n", 3);
    let diff = "diff --git a/x b/x\nnew file mode 100644\n--- /dev/null\n+++ b/x\n@@ -0,0 +1,3 @@\n+n1\n+n2\n+n3\n";
    let model = build_rows(&single_file(diff), Some(&[] as &[String]), Some(new.as_slice()));
    assert_eq!(model.len(), 3);
    assert_eq!(model.real_rows(Side::Left), 0);
    assert_eq!(model.connectors().len(), 1);
    assert_eq!(model.connectors()[0].anchor, Some(0));
}

#[test]
fn hunk_only_mode_does_not_fill_gaps() {
    let old = numbered("l", 20);
    let diff = "diff --git a/f b/f\n@@ -10,2 +10,2 @@\n l10\n-l11\n+x\n";
    let file = single_file(diff);

    let hunk_only = build_rows(&file, None, None);
    assert_eq!(hunk_only.len(), 2);

    let one_side = build_rows(&file, Some(old.as_slice()), None);
    assert_eq!(one_side.len(), 2);
}

#[test]
fn file_without_hunks_has_no_rows() {
    let file = single_file("diff --git a/logo.png b/logo.png\nBinary files a/logo.png and b/logo.png differ\n");
    let content = numbered("l", 3);
    let model = build_rows(&file, Some(content.as_slice()), Some(content.as_slice()));
    assert!(model.is_empty());
    assert!(model.connectors().is_empty());
}

#[test]
fn gaps_between_hunks_are_filled_once() {
    let old = numbered("l", 4);
    let new: Vec<String> = vec!["l1".into(), "x".into(), "l3".into(), "y".into()];
    let diff = "diff --git a/f b/f\n@@ -2,1 +2,1 @@\n-l2\n+x\n@@ -4,1 +4,1 @@\n-l4\n+y\n";
    let model = build_rows(&single_file(diff), Some(old.as_slice()), Some(new.as_slice()));
    assert_eq!(model.len(), 4);
    assert_eq!(model.connectors().len(), 2);
}

#[test]
fn grouping_respects_anchor_and_adjacency() {
    let id = |n: u32| RowId { old: None, new: Some(n) };
    let raw = |index: usize, kind: ConnectorKind, anchor: Option<u32>| ConnectorMeta {
        kind,
        first_row: id(index as u32 + 1),
        last_row: id(index as u32 + 1),
        first_index: index,
        last_index: index,
        anchor,
    };

    let grouped = group_connectors(vec![
        raw(0, ConnectorKind::Added, Some(3)),
        raw(1, ConnectorKind::Added, Some(3)),
        raw(2, ConnectorKind::Added, Some(4)),
        raw(4, ConnectorKind::Added, Some(4)),
        raw(5, ConnectorKind::Change, None),
        raw(6, ConnectorKind::Change, None),
    ]);

    assert_eq!(grouped.len(), 4);
    assert_eq!(grouped[0].rows(), 0..=1);
    assert_eq!(grouped[0].last_row, id(2));
    assert_eq!(grouped[1].rows(), 2..=2);
    assert_eq!(grouped[2].rows(), 4..=4);
    assert_eq!(grouped[3].rows(), 5..=6);
}

#[test]
fn hunk_far_past_end_of_contents_stays_bounded() {
    let file = single_file("diff --git a/f b/f\n@@ -4000000000,1 +4000000000,1 @@\n-a\n+b");
    let content = vec!["x".to_string()];
    let model = build_rows(&file, Some(content.as_slice()), Some(content.as_slice()));

    assert_eq!(model.len(), 2);
    assert_eq!(model.rows()[0].left().content(), Some("x"));
    assert!(matches!(model.rows()[1].left(), Cell::Change { line: 4000000000, .. }));
    assert_eq!(kinds(&model), vec![ConnectorKind::Change]);
}

#[test]
fn line_numbers_at_u32_max_do_not_overflow() {
    let file = DiffFile {
        old_path: Some("f".into()),
        new_path: Some("f".into()),
        status: FileStatus::Modified,
        hunks: vec![DiffHunk {
            header: "@@ -4294967295,1 +4294967295,2 @@".into(),
            old_start: u32::MAX,
            old_lines: 1,
            new_start: u32::MAX,
            new_lines: 2,
            section: String::new(),
            lines: vec![
                DiffLine::context("a", u32::MAX, u32::MAX),
                DiffLine::added("b", u32::MAX),
            ],
        }],
        binary: false,
    };
    let content = numbered("l", 2);

    let hunk_only = build_rows(&file, None, None);
    assert_eq!(hunk_only.len(), 2);

    let full = build_rows(&file, Some(content.as_slice()), Some(content.as_slice()));
    assert_eq!(full.len(), 4);
    assert_eq!(full.real_rows(Side::Left), 3);
    assert_eq!(kinds(&full), vec![ConnectorKind::Added]);
}
