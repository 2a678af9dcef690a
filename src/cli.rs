use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "photohub")]
#[command(author, version, about = "Image storage and retrieval for photographer portfolios")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database and apply migrations
    Init,

    /// Manage categories
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },

    /// Register a photographer account
    Signup {
        username: String,
        password: String,

        /// Contact address, unique across accounts
        #[arg(long)]
        email: String,

        #[command(flatten)]
        details: DetailArgs,
    },

    /// Check a photographer's credentials
    Login { username: String, password: String },

    /// Store an image file
    Upload {
        /// Image file to upload
        #[arg(required = true)]
        file: PathBuf,

        /// Username of the owning photographer
        #[arg(long)]
        owner: String,

        /// Category name to file the image under
        #[arg(long)]
        category: String,
    },

    /// Retrieve an image by id
    Fetch {
        /// Image id
        id: String,

        /// Write the payload here instead of printing a summary
        #[arg(short, long, conflicts_with = "save")]
        output: Option<PathBuf>,

        /// Write the payload to <id>.<ext> in the current directory
        #[arg(long)]
        save: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print all categories with their images as JSON
    Dashboard {
        /// Only include images owned by this username
        #[arg(long)]
        owner: Option<String>,
    },

    /// Print the photographers with work in a category as JSON
    Browse {
        /// Category name
        category: String,
    },

    /// Print a photographer's profile as JSON
    Profile { username: String },

    /// Print every photographer account as JSON
    Photographers,

    /// Display version information
    Version,
}

#[derive(Subcommand)]
pub enum CategoryAction {
    /// Add a category
    Add { name: String },

    /// List categories
    List,
}

/// Optional personal details collected at signup.
#[derive(Args, Default)]
pub struct DetailArgs {
    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub middle_name: Option<String>,

    #[arg(long)]
    pub surname: Option<String>,

    #[arg(long)]
    pub gender: Option<String>,

    /// Date of birth (YYYY-MM-DD)
    #[arg(long)]
    pub dob: Option<NaiveDate>,

    #[arg(long)]
    pub location: Option<String>,
}
