// crates/imgconv-engine/src/master_worker.rs

//! Dynamic master/worker strategy: the master streams row chunks to idle
//! workers and splices replies directly into the composite output, so
//! chunk-arrival order never matters for correctness (§4.6).

use std::collections::HashMap;

use anyhow::{anyhow, bail, Result};
use imgconv_core::{Band, Image, Operation, Pixel, RunConfig};
use imgconv_transport::{build_world, ChunkHeader, Envelope, MasterEnd, Tag, WorkerEnd};

/// Run the master/worker strategy: `config.topology.processes - 1` worker
/// threads plus the master, streaming `config.chunk_size`-row chunks.
///
/// # Errors
/// Returns an error on any I/O, protocol, or convolution failure.
pub fn run_master_worker(config: &RunConfig) -> Result<Image> {
    let num_workers = config.topology.processes.saturating_sub(1).max(1) as usize;
    let num_threads = config.topology.threads_per_process_distributed();
    let (master, worker_ends) = build_world(num_workers);

    tracing::info!(num_workers, chunk_size = config.chunk_size, "running master/worker strategy");

    std::thread::scope(|scope| -> Result<Image> {
        for (id, worker_end) in worker_ends.into_iter().enumerate() {
            scope.spawn(move || worker_loop(id, worker_end));
        }
        let result = master_loop(&master, config, num_threads);
        if let Err(err) = &result {
            tracing::error!(
                operation = "master_loop",
                error = %err,
                "master/worker run aborted; broadcasting terminate to every worker so no thread blocks forever"
            );
            // Best-effort: any worker already terminated (or never started) simply
            // drops this on the floor, since its receiver end is gone by then.
            for w in 0..master.num_workers() {
                let _ = master.send(w, Envelope::terminate());
            }
        }
        result
    })
}

fn master_loop(master: &MasterEnd, config: &RunConfig, num_threads: usize) -> Result<Image> {
    let halo = config.operation.kernel().radius();
    let mut chunk_reader = imgconv_bmp::ChunkReader::open(&config.input)?;
    let geometry = chunk_reader.geometry();
    let width = geometry.width;
    let height = geometry.height;

    let mut composite = vec![Pixel::BLACK; width as usize * height as usize];
    let mut assigned: HashMap<usize, u32> = HashMap::new();
    let mut active = 0usize;

    for w in 0..master.num_workers() {
        match next_chunk(&mut chunk_reader, config, halo)? {
            Some(result) => {
                dispatch(master, w, &result.band, num_threads, config.operation)?;
                assigned.insert(w, result.abs_first_row);
                active += 1;
            }
            None => {
                tracing::debug!(worker = w, "no chunks remain; terminating at startup");
                master.send(w, Envelope::terminate())?;
            }
        }
    }

    while active > 0 {
        let (w, header_env) = master.recv_any().map_err(|e| {
            tracing::error!(operation = "recv_any", error = %e, "master failed to probe worker replies");
            e
        })?;
        let header = match header_env.tag {
            Tag::WorkHeaderReply => header_env
                .header
                .ok_or_else(|| anyhow!("worker {w} sent WorkHeaderReply with no header"))?,
            other => {
                tracing::error!(worker = w, operation = "recv_header_reply", tag = ?other, "worker sent an unexpected tag while master awaited a reply header");
                bail!("worker {w} sent unexpected tag {other:?} while master awaited a reply header");
            }
        };
        let data_env = master.recv_from(w).map_err(|e| {
            tracing::error!(worker = w, operation = "recv_data_reply", error = %e, "master failed to receive the reply payload");
            e
        })?;
        let payload = match data_env.tag {
            Tag::WorkDataReply => data_env
                .payload
                .ok_or_else(|| anyhow!("worker {w} sent WorkDataReply with no payload"))?,
            other => {
                tracing::error!(worker = w, operation = "recv_data_reply", tag = ?other, "worker sent an unexpected tag while master awaited the reply payload");
                bail!("worker {w} sent unexpected tag {other:?} while master awaited the reply payload");
            }
        };

        let abs_first_row = assigned
            .remove(&w)
            .ok_or_else(|| anyhow!("worker {w} replied but had no chunk assigned"))?;
        let owned_rows = (header.true_end - header.true_start + 1) as u32;
        tracing::debug!(worker = w, abs_first_row, owned_rows, "splicing reply");
        splice(&mut composite, width, abs_first_row, owned_rows, &payload).map_err(|e| {
            tracing::error!(worker = w, operation = "splice", error = %e, "failed to splice worker reply into the composite image");
            e
        })?;
        active -= 1;

        match next_chunk(&mut chunk_reader, config, halo)? {
            Some(result) => {
                dispatch(master, w, &result.band, num_threads, config.operation)?;
                assigned.insert(w, result.abs_first_row);
                active += 1;
            }
            None => {
                tracing::debug!(worker = w, "no more chunks; terminating");
                master.send(w, Envelope::terminate())?;
            }
        }
    }

    tracing::info!("master/worker run complete");
    Image::new(width, height, composite).map_err(Into::into)
}

fn next_chunk(
    chunk_reader: &mut imgconv_bmp::ChunkReader,
    config: &RunConfig,
    halo: u32,
) -> Result<Option<imgconv_bmp::ChunkResult>> {
    chunk_reader.next_chunk(config.chunk_size, halo).map_err(|e| {
        tracing::error!(operation = "next_chunk", error = %e, "master failed to read the next chunk");
        e
    })
}

fn dispatch(master: &MasterEnd, w: usize, band: &Band, num_threads: usize, operation: Operation) -> Result<()> {
    let header = ChunkHeader {
        true_start: band.true_start() as i32,
        true_end: band.true_end() as i32,
        height: band.image().height() as i32,
        width: band.image().width() as i32,
        num_threads: num_threads as i32,
        operation_tag: operation.tag(),
    };
    master.send(w, Envelope::header(Tag::WorkHeaderSend, header)).map_err(|e| {
        tracing::error!(worker = w, operation = "dispatch_header", error = %e, "master failed to send work header");
        e
    })?;
    master
        .send(w, Envelope::data(Tag::WorkDataSend, band.image().pixels().to_vec()))
        .map_err(|e| {
            tracing::error!(worker = w, operation = "dispatch_data", error = %e, "master failed to send work payload");
            e
        })?;
    Ok(())
}

fn splice(composite: &mut [Pixel], width: u32, abs_first_row: u32, owned_rows: u32, payload: &[Pixel]) -> Result<()> {
    let start = abs_first_row as usize * width as usize;
    let len = owned_rows as usize * width as usize;
    anyhow::ensure!(
        payload.len() == len,
        "reply payload has {} pixels, expected {len} ({owned_rows} rows x {width} wide)",
        payload.len()
    );
    composite[start..start + len].copy_from_slice(payload);
    Ok(())
}

fn worker_loop(id: usize, worker: WorkerEnd) -> Result<()> {
    let result = worker_loop_inner(id, &worker);
    if let Err(err) = &result {
        tracing::error!(worker = id, operation = "worker_loop", error = %err, "worker aborting");
    }
    result
}

fn worker_loop_inner(id: usize, worker: &WorkerEnd) -> Result<()> {
    loop {
        let env = worker.recv().map_err(|e| {
            tracing::error!(worker = id, operation = "recv_header", error = %e, "worker failed to receive its next message");
            e
        })?;
        match env.tag {
            Tag::Terminate => {
                tracing::debug!(worker = id, "worker terminating");
                return Ok(());
            }
            Tag::WorkHeaderSend => {
                let header = env.header.ok_or_else(|| anyhow!("WorkHeaderSend with no header"))?;
                let data_env = worker.recv().map_err(|e| {
                    tracing::error!(worker = id, operation = "recv_data", error = %e, "worker failed to receive its work payload");
                    e
                })?;
                let payload = match data_env.tag {
                    Tag::WorkDataSend => {
                        data_env.payload.ok_or_else(|| anyhow!("WorkDataSend with no payload"))?
                    }
                    other => {
                        tracing::error!(worker = id, operation = "recv_data", tag = ?other, "worker received an unexpected tag while awaiting its work payload");
                        bail!("expected WorkDataSend, got {other:?}");
                    }
                };

                let width = header.width as u32;
                let band_height = header.height as u32;
                let image = Image::new(width, band_height, payload)?;
                let band = Band::new(image, header.true_start as u32, header.true_end as u32)?;

                let operation = Operation::from_tag(header.operation_tag)
                    .ok_or_else(|| anyhow!("unknown operation tag {}", header.operation_tag))?;
                let kernel = operation.kernel();
                let out = imgconv_conv::apply(&band, &kernel, header.num_threads.max(1) as usize).map_err(|e| {
                    tracing::error!(worker = id, operation = "convolve", error = %e, "worker failed to convolve its chunk");
                    e
                })?;

                let reply_header = ChunkHeader {
                    true_start: 0,
                    true_end: out.height() as i32 - 1,
                    height: out.height() as i32,
                    width: out.width() as i32,
                    num_threads: header.num_threads,
                    operation_tag: header.operation_tag,
                };
                worker.send(Envelope::header(Tag::WorkHeaderReply, reply_header)).map_err(|e| {
                    tracing::error!(worker = id, operation = "reply_header", error = %e, "worker failed to send reply header");
                    e
                })?;
                worker.send(Envelope::data(Tag::WorkDataReply, out.into_pixels())).map_err(|e| {
                    tracing::error!(worker = id, operation = "reply_data", error = %e, "worker failed to send reply payload");
                    e
                })?;
            }
            other => {
                tracing::error!(worker = id, operation = "recv_header", tag = ?other, "worker received an unexpected tag");
                bail!("worker received unexpected tag {other:?}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splice_rejects_a_mismatched_payload_length() {
        let mut composite = vec![Pixel::BLACK; 4 * 4];
        let payload = vec![Pixel::BLACK; 3];
        assert!(splice(&mut composite, 4, 0, 2, &payload).is_err());
    }

    #[test]
    fn splice_writes_into_the_correct_absolute_offset() {
        let mut composite = vec![Pixel::BLACK; 4 * 4];
        let marker = Pixel::new(9, 9, 9);
        let payload = vec![marker; 4];
        splice(&mut composite, 4, 2, 1, &payload).unwrap();
        assert_eq!(&composite[8..12], &payload[..]);
        assert_eq!(composite[0], Pixel::BLACK);
    }
}
