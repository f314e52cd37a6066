use image::DynamicImage;
use serde::Deserialize;

use crate::geometry::{BoundingBox, ExtentBox};

/// Speaker of a transcript turn
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Role {
    User,
    Assistant,
    System,
    Other(String),
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            "system" => Role::System,
            _ => Role::Other(value),
        }
    }
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Other(name) => name,
        }
    }

    /// Upper-cased name used as the transcript line prefix
    pub fn label(&self) -> String {
        self.as_str().to_uppercase()
    }
}

/// One element of a block-shaped message
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: Some(text.into()),
        }
    }

    pub fn is_text(&self) -> bool {
        self.kind == "text"
    }
}

/// Message body: a plain string or a sequence of typed blocks
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Content {
    PlainText(String),
    Blocks(Vec<ContentBlock>),
    /// Any other JSON shape; carries no text
    Unsupported(serde_json::Value),
}

impl Default for Content {
    fn default() -> Self {
        Content::Unsupported(serde_json::Value::Null)
    }
}

impl Content {
    /// Textual content of the message, `None` for unsupported shapes.
    /// Text blocks are concatenated in order; other blocks are ignored.
    pub fn text(&self) -> Option<String> {
        match self {
            Content::PlainText(text) => Some(text.clone()),
            Content::Blocks(blocks) => Some(
                blocks
                    .iter()
                    .filter(|block| block.is_text())
                    .filter_map(|block| block.text.as_deref())
                    .collect(),
            ),
            Content::Unsupported(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Turn {
    pub role: Role,
    #[serde(default)]
    pub content: Content,
}

impl Turn {
    pub fn new(role: Role, content: Content) -> Self {
        Self { role, content }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, Content::PlainText(text.into()))
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, Content::PlainText(text.into()))
    }
}

pub type Transcript = Vec<Turn>;

/// One line of the evaluation results file
#[derive(Debug, Clone, Deserialize)]
pub struct EvalRecord {
    pub image: String,
    pub question: String,
    pub answer: String,
    pub pred_ans: String,
    pub acc: bool,
    #[serde(default)]
    pub pred_output: Transcript,
}

/// Ground-truth descriptor stored next to each image
#[derive(Debug, Clone, Deserialize)]
pub struct GroundTruth {
    pub bbox: Vec<ExtentBox>,
}

/// Which output partition a sample's report lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Fail,
}

impl Outcome {
    pub fn from_acc(acc: bool) -> Self {
        if acc { Outcome::Success } else { Outcome::Fail }
    }

    /// Directory name of the partition
    pub fn partition(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Fail => "fail",
        }
    }

    /// Literal shown on the summary page
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Success => "Success!",
            Outcome::Fail => "Fail!",
        }
    }
}

/// A loaded sample: evaluation record plus its image and ground truth
#[derive(Debug, Clone)]
pub struct Sample {
    pub image_name: String,
    pub image: DynamicImage,
    pub question: String,
    pub answer: String,
    pub pred_ans: String,
    pub acc: bool,
    pub gt_boxes: Vec<ExtentBox>,
    pub transcript: Transcript,
}

impl Sample {
    pub fn from_record(record: EvalRecord, image: DynamicImage, ground_truth: GroundTruth) -> Self {
        Self {
            image_name: record.image,
            image,
            question: record.question,
            answer: record.answer,
            pred_ans: record.pred_ans,
            acc: record.acc,
            gt_boxes: ground_truth.bbox,
            transcript: record.pred_output,
        }
    }

    pub fn outcome(&self) -> Outcome {
        Outcome::from_acc(self.acc)
    }

    /// Ground-truth boxes converted to corner form
    pub fn gt_corner_boxes(&self) -> Vec<BoundingBox> {
        self.gt_boxes.iter().map(|b| b.to_corner_form()).collect()
    }
}
