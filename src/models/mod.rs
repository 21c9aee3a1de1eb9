pub mod notification;
pub mod session;
pub mod token;
pub mod ui;
pub mod user;

pub use notification::{NewNotification, Notification, NotificationAction, NotificationKind};
pub use session::{Session, SessionSnapshot, SessionStatus, SessionUser};
pub use token::{Token, TokenState};
pub use ui::{Modal, ModalSize, NewModal, Theme};
pub use user::{Role, User, UserUpdate};
