pub mod chatrooms;
pub mod connect_requests;
pub mod profiles;
pub mod runs;

pub use chatrooms::{Chatroom, ChatroomRow, ChatroomType, NewChatroom};
pub use connect_requests::{ConnectRequest, ConnectRequestRow, RequestStatus, RequestType};
pub use profiles::Profile;
pub use runs::{RequestOutcome, RunFailure, RunResult, RunSuccess, RunSummary, SkipReason};
