mod common;

use common::*;
use groundcheck::extract_proposed_boxes;
use groundcheck::extraction::scan_boxes;

fn corners(boxes: &[BoundingBox]) -> Vec<[f64; 4]> {
    boxes.iter().map(|b| [b.x1, b.y1, b.x2, b.y2]).collect()
}

#[test]
fn duplicate_box_in_one_turn_appears_once() {
    let transcript = vec![Turn::assistant("[10,20,30,40] and [10,20,30,40]")];
    assert_eq!(corners(&extract_proposed_boxes(&transcript)), vec![[10.0, 20.0, 30.0, 40.0]]);
}

#[test]
fn duplicates_across_turns_keep_first_position() {
    let transcript = vec![
        Turn::assistant("look at [1, 2, 3, 4]"),
        Turn::assistant("now [5,6,7,8] then again [1,2,3,4]"),
        Turn::assistant("[9, 9, 9, 9] [5, 6, 7, 8]"),
    ];
    assert_eq!(
        corners(&extract_proposed_boxes(&transcript)),
        vec![[1.0, 2.0, 3.0, 4.0], [5.0, 6.0, 7.0, 8.0], [9.0, 9.0, 9.0, 9.0]]
    );
}

#[test]
fn non_assistant_turns_are_ignored() {
    let transcript = vec![
        Turn::new(Role::System, Content::PlainText("[0,0,1,1]".into())),
        Turn::user("the object is at [10,20,30,40]"),
        Turn::assistant("I will zoom into [50, 60, 70, 80]"),
    ];
    assert_eq!(corners(&extract_proposed_boxes(&transcript)), vec![[50.0, 60.0, 70.0, 80.0]]);
}

#[test]
fn decimals_are_truncated_not_rounded() {
    assert_eq!(scan_boxes("[10.9, 20.5, 30.99, 40.]"), vec![[10, 20, 30, 40]]);

    // different literals that truncate to the same tuple are duplicates
    let transcript = vec![Turn::assistant("[1.2,2,3,4] [1.8, 2, 3, 4]")];
    assert_eq!(extract_proposed_boxes(&transcript).len(), 1);
}

#[test]
fn malformed_lists_do_not_match() {
    assert!(scan_boxes("[1, 2, 3]").is_empty());
    assert!(scan_boxes("[1, 2, 3, 4, 5]").is_empty());
    assert!(scan_boxes("[-1, 2, 3, 4]").is_empty());
    assert!(scan_boxes("(1, 2, 3, 4)").is_empty());
}

#[test]
fn block_content_concatenates_text_blocks() {
    let transcript = vec![Turn::new(
        Role::Assistant,
        Content::Blocks(vec![
            ContentBlock::text("first [1,1,5,5]"),
            ContentBlock {
                kind: "image_url".to_string(),
                text: Some("[9,9,9,9]".to_string()),
            },
            ContentBlock::text(" second [2,2,6,6]"),
        ]),
    )];
    assert_eq!(
        corners(&extract_proposed_boxes(&transcript)),
        vec![[1.0, 1.0, 5.0, 5.0], [2.0, 2.0, 6.0, 6.0]]
    );
}

#[test]
fn transcript_parses_both_content_shapes() -> anyhow::Result<()> {
    let json = r#"[
        {"role": "system", "content": "You are helpful."},
        {"role": "user", "content": [
            {"type": "image_url", "image_url": {"url": "data:..."}},
            {"type": "text", "text": "Where is the cat?"}
        ]},
        {"role": "assistant", "content": [{"type": "text", "text": "zoom [12.7, 3, 40, 50]"}]},
        {"role": "assistant", "content": 42},
        {"role": "tool", "content": "[1,2,3,4]"}
    ]"#;
    let transcript: Vec<Turn> = serde_json::from_str(json)?;

    assert_eq!(transcript[1].content.text().as_deref(), Some("Where is the cat?"));
    assert_eq!(transcript[3].content.text(), None);
    assert_eq!(transcript[4].role, Role::Other("tool".to_string()));
    assert_eq!(corners(&extract_proposed_boxes(&transcript)), vec![[12.0, 3.0, 40.0, 50.0]]);
    Ok(())
}
