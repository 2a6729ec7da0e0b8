//
//  graph-client
//  cli/publish.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Write commands
//!
//! Every command here needs an access token; without one it fails before
//! any request is made.
//!
//! ## Examples
//!
//! ```bash
//! graph publish wall "Hello" --link https://example.com
//! graph publish comment 123_456 "Nice"
//! graph publish like 123_456
//! graph publish like 123_456 --undo
//! graph publish photo ./cat.jpg --message "My cat"
//! graph publish video ./clip.mp4 --target 12345 -F title=Clip
//! graph publish create me/notes -F subject=Hi -F message=Body
//! graph publish update 123_456 -F message=Edited
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};

use crate::api::{GraphApi, Params, UploadFile};

use super::{parse_fields, GlobalOptions, Session};

/// Write to the graph
#[derive(Args, Debug)]
pub struct PublishCommand {
    #[command(subcommand)]
    pub command: PublishSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum PublishSubcommand {
    /// Post a message to a feed
    Wall(WallArgs),

    /// Comment on an object
    Comment(CommentArgs),

    /// Like an object, or remove a like
    Like(LikeArgs),

    /// Upload a photo
    Photo(UploadArgs),

    /// Upload a video
    Video(UploadArgs),

    /// Create an object on a connection (ID/CONNECTION)
    Create(CreateArgs),

    /// Update fields of an existing object
    Update(UpdateArgs),
}

#[derive(Args, Debug)]
pub struct WallArgs {
    /// Message text
    pub message: String,

    /// Profile or page whose feed receives the post
    #[arg(long, default_value = "me")]
    pub profile: String,

    /// Link to attach
    #[arg(long)]
    pub link: Option<String>,

    /// Extra attachment fields: key=value (repeatable)
    #[arg(long, short = 'F', action = clap::ArgAction::Append)]
    pub field: Vec<String>,
}

#[derive(Args, Debug)]
pub struct CommentArgs {
    /// Object to comment on
    pub id: String,

    /// Comment text
    pub message: String,
}

#[derive(Args, Debug)]
pub struct LikeArgs {
    /// Object to like
    pub id: String,

    /// Remove the like instead
    #[arg(long)]
    pub undo: bool,
}

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// File to upload
    pub file: PathBuf,

    /// Album, page or profile receiving the upload
    #[arg(long, default_value = "me")]
    pub target: String,

    /// Caption or description
    #[arg(long, short = 'm')]
    pub message: Option<String>,

    /// Extra fields: key=value (repeatable)
    #[arg(long, short = 'F', action = clap::ArgAction::Append)]
    pub field: Vec<String>,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Target as ID/CONNECTION, e.g. me/feed
    pub target: String,

    /// Fields: key=value, key:=json, key=@file (repeatable)
    #[arg(long, short = 'F', action = clap::ArgAction::Append)]
    pub field: Vec<String>,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Object id
    pub id: String,

    /// Fields: key=value, key:=json (repeatable)
    #[arg(long, short = 'F', action = clap::ArgAction::Append, required = true)]
    pub field: Vec<String>,
}

impl PublishCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let options = session.options(global);
        let client = &session.client;

        let result = match &self.command {
            PublishSubcommand::Wall(args) => {
                let mut attachment = parse_fields(&args.field).await?;
                if let Some(link) = &args.link {
                    attachment.insert("link", link);
                }
                client
                    .put_wall_post(&args.message, attachment, &args.profile, options)
                    .await?
            }
            PublishSubcommand::Comment(args) => client.put_comment(&args.id, &args.message, options).await?,
            PublishSubcommand::Like(args) if args.undo => client.delete_like(&args.id, options).await?,
            PublishSubcommand::Like(args) => client.put_like(&args.id, options).await?,
            PublishSubcommand::Photo(args) => {
                let (file, params) = upload_parts(args, "message").await?;
                client.put_picture(&args.target, file, params, options).await?
            }
            PublishSubcommand::Video(args) => {
                let (file, params) = upload_parts(args, "description").await?;
                client.put_video(&args.target, file, params, options).await?
            }
            PublishSubcommand::Create(args) => {
                let (id, connection) = split_target(&args.target)?;
                let params = parse_fields(&args.field).await?;
                client.put_connections(id, connection, params, options).await?
            }
            PublishSubcommand::Update(args) => {
                let params = parse_fields(&args.field).await?;
                client.put_object(&args.id, params, options).await?
            }
        };

        session.output.write_result(&result, None)
    }
}

/// Reads the upload and folds the caption into the extra fields.
async fn upload_parts(args: &UploadArgs, caption_key: &str) -> Result<(UploadFile, Params)> {
    let file = UploadFile::open(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let mut params = parse_fields(&args.field).await?;
    if let Some(message) = &args.message {
        params.insert(caption_key, message);
    }
    tracing::debug!(file = %file.file_name, bytes = file.bytes.len(), "Prepared upload");
    Ok((file, params))
}

/// Splits `ID/CONNECTION` on the last slash.
fn split_target(target: &str) -> Result<(&str, &str)> {
    match target.trim_matches('/').rsplit_once('/') {
        Some((id, connection)) if !id.is_empty() && !connection.is_empty() => Ok((id, connection)),
        _ => bail!("Target must look like ID/CONNECTION, got '{target}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_target() {
        assert_eq!(split_target("me/feed").unwrap(), ("me", "feed"));
        assert_eq!(split_target("/123/comments/").unwrap(), ("123", "comments"));
        assert!(split_target("me").is_err());
        assert!(split_target("/feed").is_err());
    }

    #[tokio::test]
    async fn test_upload_parts_caption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"mp4").unwrap();

        let args = UploadArgs {
            file: path,
            target: "me".into(),
            message: Some("Holiday".into()),
            field: vec!["title=Clip".into()],
        };
        let (file, params) = upload_parts(&args, "description").await.unwrap();
        assert_eq!(file.content_type, "video/mp4");
        assert_eq!(params.encode(), "description=Holiday&title=Clip");
    }
}
