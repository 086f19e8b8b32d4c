// Copyright 2019 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::error::{self, Result};
use crate::io::max_size_adapter;
use crate::transport::{IntoVec, Transport};
use log::trace;
use snafu::ResultExt;
use url::Url;

/// Fetches `url` in full, failing once more than `max_size` bytes have been read.
pub(crate) async fn fetch_max_size(
    transport: &dyn Transport,
    url: Url,
    max_size: u64,
    specifier: &'static str,
) -> Result<Vec<u8>> {
    trace!("Fetching {} (at most {} bytes)", url, max_size);
    let stream = transport
        .fetch(url.clone())
        .await
        .with_context(|_| error::TransportSnafu { url: url.clone() })?;

    let stream = max_size_adapter(stream, url.clone(), max_size, specifier);
    stream
        .into_vec()
        .await
        .context(error::TransportSnafu { url })
}
