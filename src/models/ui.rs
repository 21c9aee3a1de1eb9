use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModalSize {
    Sm,
    #[default]
    Md,
    Lg,
    Xl,
}

/// An open dialog on the modal stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modal {
    pub id: Uuid,
    pub title: String,
    pub size: ModalSize,
    pub closeable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewModal {
    pub title: String,
    pub size: ModalSize,
    pub closeable: bool,
}

impl NewModal {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            size: ModalSize::default(),
            closeable: true,
        }
    }

    pub fn size(mut self, size: ModalSize) -> Self {
        self.size = size;
        self
    }

    pub fn closeable(mut self, closeable: bool) -> Self {
        self.closeable = closeable;
        self
    }
}
