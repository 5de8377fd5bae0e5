mod entity_iterator;

pub use entity_iterator::{EntityIterator, IteratorKind, IteratorSink};
