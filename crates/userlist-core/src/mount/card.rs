/// One rendered user card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    /// Id carried by the card's delete control.
    pub id: i64,
    pub header: String,
    /// Labelled body lines, e.g. ("Username", "Bret").
    pub fields: Vec<(&'static str, String)>,
    pub address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    FetchFailed,
    StorageUnreadable,
    NoData,
}

impl NoticeKind {
    /// Short, non-technical text shown to the user.
    pub fn message(&self) -> &'static str {
        match self {
            NoticeKind::FetchFailed => "User data could not be retrieved. Please try again later.",
            NoticeKind::StorageUnreadable => "Saved data could not be read. Please refresh the page.",
            NoticeKind::NoData => "No user data found. Reloading...",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: &'static str,
}

impl Notice {
    pub fn new(kind: NoticeKind) -> Self {
        Self {
            kind,
            message: kind.message(),
        }
    }
}
