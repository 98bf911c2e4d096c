/// The three stages of shift entry, in order.
///
/// Readings and Dips each gate the step to the next stage; Review is
/// terminal and exits only through commit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntryStage {
    Readings,
    Dips,
    Review,
}

impl EntryStage {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryStage::Readings => "readings",
            EntryStage::Dips => "dips",
            EntryStage::Review => "review",
        }
    }
}

impl std::fmt::Display for EntryStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
