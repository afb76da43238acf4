//! Static descriptors for the three assessment formats.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Placeholder stored for an item left blank when its time ran out.
pub const NO_RESPONSE: &str = "(No response)";

pub const WORDS: [&str; 5] = ["friend", "fear", "courage", "class", "games"];

pub const SITUATIONS: [&str; 5] = [
    "You see someone drop their wallet on a busy street.",
    "Your boss gives you negative feedback on a project you worked hard on.",
    "You are stuck in a traffic jam and are running late for an important meeting.",
    "A friend tells you a secret and asks you not to tell anyone.",
    "You witness a minor car accident where no one appears to be hurt.",
];

pub const WORD_SECONDS: u32 = 22;
pub const SITUATION_SECONDS: u32 = 30;
pub const PPDT_PERCEPTION_SECONDS: u32 = 30;
pub const PPDT_DETAILS_SECONDS: u32 = 30;
pub const PPDT_STORY_SECONDS: u32 = 240;

/// Bounds for the number of characters a candidate may describe in the PPDT.
pub const MIN_CHARACTERS: usize = 1;
pub const MAX_CHARACTERS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestMode {
    WordAssociation,
    SituationReaction,
    Ppdt,
}

impl TestMode {
    pub const ALL: [TestMode; 3] = [
        TestMode::WordAssociation,
        TestMode::SituationReaction,
        TestMode::Ppdt,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TestMode::WordAssociation => "word-association",
            TestMode::SituationReaction => "situation-reaction",
            TestMode::Ppdt => "ppdt",
        }
    }
}

impl fmt::Display for TestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TestMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown test mode '{s}'"))
    }
}

/// The three PPDT phases, in the only order they may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PpdtStage {
    Perception,
    Details,
    Story,
}

impl PpdtStage {
    pub fn seconds(self) -> u32 {
        match self {
            PpdtStage::Perception => PPDT_PERCEPTION_SECONDS,
            PpdtStage::Details => PPDT_DETAILS_SECONDS,
            PpdtStage::Story => PPDT_STORY_SECONDS,
        }
    }

    /// The stage that follows on expiry; `None` for the story, which submits.
    pub fn next(self) -> Option<PpdtStage> {
        match self {
            PpdtStage::Perception => Some(PpdtStage::Details),
            PpdtStage::Details => Some(PpdtStage::Story),
            PpdtStage::Story => None,
        }
    }
}

/// How a test collects its answers.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TestShape {
    /// A fixed list of prompts answered one at a time.
    ItemLoop {
        items: &'static [&'static str],
        seconds_per_item: u32,
    },
    /// Perception, details, then story.
    Phased {
        perception_seconds: u32,
        details_seconds: u32,
        story_seconds: u32,
    },
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TestDescriptor {
    pub mode: TestMode,
    pub title: &'static str,
    pub description: &'static str,
    pub instructions_title: &'static str,
    pub instructions: &'static [&'static str],
    pub shape: TestShape,
}

impl TestDescriptor {
    /// Prompts for item-based tests; empty for the PPDT.
    pub fn items(&self) -> &'static [&'static str] {
        match self.shape {
            TestShape::ItemLoop { items, .. } => items,
            TestShape::Phased { .. } => &[],
        }
    }
}

static WORD_ASSOCIATION: TestDescriptor = TestDescriptor {
    mode: TestMode::WordAssociation,
    title: "Word Association Test",
    description: "Analyze your subconscious thoughts and emotional responses through word association.",
    instructions_title: "Word Association Test (WAT) Instructions",
    instructions: &[
        "You will be shown 5 words, one by one.",
        "For each word, you will have 22 seconds to write a sentence.",
        "Your responses are saved automatically when the timer ends or you move to the next word.",
        "Be spontaneous and write whatever comes to your mind first.",
    ],
    shape: TestShape::ItemLoop {
        items: &WORDS,
        seconds_per_item: WORD_SECONDS,
    },
};

static SITUATION_REACTION: TestDescriptor = TestDescriptor {
    mode: TestMode::SituationReaction,
    title: "Situation Reaction Test",
    description: "Evaluate your decision-making and problem-solving skills under pressure.",
    instructions_title: "Situation Reaction Test Instructions",
    instructions: &[
        "You will be presented with 5 different situations.",
        "For each situation, you have 30 seconds to describe how you would react.",
        "Your responses are saved automatically.",
        "Focus on providing a clear and decisive course of action.",
    ],
    shape: TestShape::ItemLoop {
        items: &SITUATIONS,
        seconds_per_item: SITUATION_SECONDS,
    },
};

static PPDT: TestDescriptor = TestDescriptor {
    mode: TestMode::Ppdt,
    title: "Picture Perception Test",
    description: "Assess your perception, imagination, and storytelling abilities with a visual prompt.",
    instructions_title: "PPDT Instructions",
    instructions: &[
        "You will be shown an image for 30 seconds. Observe it carefully.",
        "Next, you will have 30 seconds to note down the number of characters, their gender, and their mood.",
        "Finally, you will have 4 minutes to write a story about what led to the situation, what is happening, and what the outcome will be.",
        "Your story should be coherent and based on your perception of the image.",
    ],
    shape: TestShape::Phased {
        perception_seconds: PPDT_PERCEPTION_SECONDS,
        details_seconds: PPDT_DETAILS_SECONDS,
        story_seconds: PPDT_STORY_SECONDS,
    },
};

pub fn descriptor(mode: TestMode) -> &'static TestDescriptor {
    match mode {
        TestMode::WordAssociation => &WORD_ASSOCIATION,
        TestMode::SituationReaction => &SITUATION_REACTION,
        TestMode::Ppdt => &PPDT,
    }
}

pub fn all() -> [&'static TestDescriptor; 3] {
    TestMode::ALL.map(descriptor)
}
