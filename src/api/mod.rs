pub mod format;

pub use format::{
    AttendanceView, ChildView, GroupView, Lookup, PaymentView, ProgramView, Ref, UserView,
};
