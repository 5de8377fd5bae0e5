use devlink_server::shared::{messages::MessageKind, ReadFrame};
use devlink_shared::ProtoDecode;

/// Message kinds of `frames`, in arrival order. Unknown ids panic.
pub fn kinds(frames: &[ReadFrame]) -> Vec<MessageKind> {
    frames
        .iter()
        .map(|frame| {
            MessageKind::from_id(frame.message_type)
                .unwrap_or_else(|| panic!("unknown message type {}", frame.message_type))
        })
        .collect()
}

/// Decodes every frame of `kind` in `frames`
pub fn decode_all<M: ProtoDecode>(frames: &[ReadFrame], kind: MessageKind) -> Vec<M> {
    frames
        .iter()
        .filter(|frame| frame.message_type == kind.id())
        .map(|frame| {
            M::decode(&frame.payload)
                .unwrap_or_else(|error| panic!("{} did not decode: {}", kind.name(), error))
        })
        .collect()
}

/// Assert that `frames` carry exactly the given message kinds, in order
#[macro_export]
macro_rules! assert_kinds {
    ($frames:expr, [$($kind:ident),* $(,)?]) => {
        assert_eq!(
            $crate::kinds(&$frames),
            vec![$(devlink_server::shared::messages::MessageKind::$kind),*],
            "unexpected messages from server"
        );
    };
}
