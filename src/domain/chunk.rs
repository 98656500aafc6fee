/// An ordered slice of a larger text, sized for one external call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub index: usize,
    pub text: String,
    /// Set when a single sentence exceeded the budget and had to be cut mid-sentence.
    pub forced_split: bool,
}

impl TextChunk {
    pub fn new(index: usize, text: String) -> Self {
        Self {
            index,
            text,
            forced_split: false,
        }
    }

    pub fn forced(index: usize, text: String) -> Self {
        Self {
            index,
            text,
            forced_split: true,
        }
    }
}
