pub mod callback;
pub mod column;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod export;
pub mod filter;
pub mod pagination;
pub mod row;
pub mod row_model;
pub mod selection;
pub mod slice;
pub mod sorting;
pub mod state;
pub mod toolbar;

pub use engine::{TableOptions, TableStateEngine};

pub mod prelude {
    pub use crate::callback::{Callback, Updater};
    pub use crate::column::{ColumnDef, ColumnModel, Header};
    pub use crate::config::TableConfig;
    pub use crate::engine::{
        BodyCell, ComputationMode, HeaderKind, RowModel, RowView, TableBody, TableOptions,
        TableStateEngine, TableView,
    };
    pub use crate::error::{ExportError, TableError};
    pub use crate::events::EventResult;
    pub use crate::export::{
        DirectorySaver, ExportArtifact, ExportFormat, ExportScope, FileSaver,
    };
    pub use crate::pagination::PaginationController;
    pub use crate::row::{CellValue, TableRow};
    pub use crate::selection::{CheckState, RowSelection};
    pub use crate::sorting::{ColumnSort, SortDirection, SortingState};
    pub use crate::state::{ColumnFilters, PaginationState, VisibilityState};
    pub use crate::toolbar::ToolbarAction;
}
