pub mod comparator;
pub mod engine;
pub mod entry;
pub mod ignore;
pub mod materializer;
pub mod path_map;
pub mod queue;
pub mod reload;
pub mod scanner;
pub mod session;
pub mod watcher;

pub use comparator::TreeDiffer;
pub use engine::{run, Phase, RunOptions, SyncEngine, SyncReport};
pub use entry::{EntryKind, FileEntry, Side};
pub use ignore::IgnoreMatcher;
pub use materializer::{DirMaterializer, Materialized};
pub use path_map::PathMapper;
pub use queue::{QueueState, TransferQueue};
pub use reload::{BroadcastReloader, ReloadEvent, ReloadHook};
pub use scanner::TreeLister;
pub use session::Session;
pub use watcher::ChangeWatcher;
