// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! `bapx chat`

use std::io::{self, Write};

use crossterm::style::{ResetColor, SetForegroundColor};
use crossterm::ExecutableCommand;

use super::print_json;
use crate::app::AppContext;
use crate::cli::{ChatArgs, OutputFormat};
use crate::error::Result;
use crate::router::{Attachment, ChatRequest, ChatReply};
use crate::utils::capability_color;

/// Build the request, pulling history from the stored conversation when continuing.
pub fn build_request(ctx: &AppContext, args: &ChatArgs) -> Result<ChatRequest> {
    let mut request = ChatRequest::new(args.message.join(" "));

    if let Some(name) = &args.file {
        request = request.with_attachment(Attachment::new(name, &args.mime));
    }

    if args.continue_reasoning {
        match ctx.store().load_conversation(ctx.project_root(), ctx.user_id())? {
            Some(record) => request = request.with_history(record.messages),
            None => tracing::debug!("No stored conversation to continue"),
        }
    }

    Ok(request)
}

fn print_reply(reply: &ChatReply) -> Result<()> {
    let mut stdout = io::stdout();
    stdout.execute(SetForegroundColor(capability_color(reply.target)))?;
    write!(stdout, "[{}] ", reply.target)?;
    stdout.execute(ResetColor)?;
    writeln!(stdout, "{}", reply.response)?;
    Ok(())
}

pub async fn execute(ctx: &AppContext, args: &ChatArgs, format: &OutputFormat) -> Result<()> {
    let ctx_owned;
    let ctx = match &args.model {
        Some(model) => {
            let mut settings = ctx.settings().clone();
            settings.model.model = model.clone();
            ctx_owned = AppContext::new(
                settings,
                ctx.project_root().to_path_buf(),
                ctx.user_id().map(str::to_string),
            )?;
            &ctx_owned
        }
        None => ctx,
    };

    let request = build_request(ctx, args)?;
    let service = ctx.conversation_service()?;
    let reply = service
        .handle(ctx.project_root(), ctx.user_id(), &request)
        .await?;

    if matches!(format, OutputFormat::Json) {
        return print_json(&reply);
    }
    print_reply(&reply)
}
