use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "backoffice")]
#[command(version, about = "A mock business-administration backend with a demo dataset")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a backoffice project in the current directory and seed
    /// the demo data
    Init,

    /// Discard all persisted state and reseed the demo data
    Reset,

    /// List all rows of an entity
    List {
        /// Entity to list (role, employee, customer, project, invoice, task, note)
        entity: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a row from a flat JSON record (relations as <field>_id)
    Add {
        /// Entity to create
        entity: String,

        /// Flat record, e.g. '{"name": "Engineer"}'
        #[arg(long)]
        data: String,

        /// Output the created row as JSON
        #[arg(long)]
        json: bool,
    },

    /// Merge a partial flat JSON record into an existing row
    Update {
        /// Entity to update
        entity: String,

        /// Row id
        id: u64,

        /// Partial flat record, e.g. '{"department": "Sales"}'
        #[arg(long)]
        data: String,

        /// Output the updated row as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a row (cascades to dependent rows)
    Delete {
        /// Entity to delete from
        entity: String,

        /// Row id
        id: u64,
    },

    /// Move a row above or below another row
    Move {
        /// Entity to reorder
        entity: String,

        /// Row to move
        id: u64,

        /// Row to move it relative to
        target: u64,

        /// Placement relative to the target (above or below)
        #[arg(long, default_value = "above")]
        position: String,
    },
}
