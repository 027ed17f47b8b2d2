use async_trait::async_trait;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt as _, AsyncReadExt as _, AsyncWrite, AsyncWriteExt as _,
};

use crate::{Error, FixedRecord, Record, Result};

/// Encodes and decodes one record at a time.
///
/// `decode` returns `Ok(None)` once the reader is exhausted on a record
/// boundary.
#[async_trait]
pub trait Codec {
    async fn encode<S, W>(&self, writer: &mut W, sample: &S) -> Result<()>
    where
        S: FixedRecord + Sync,
        W: AsyncWrite + Unpin + Send;

    async fn decode<S, R>(&self, reader: &mut R) -> Result<Option<S>>
    where
        S: FixedRecord + Send,
        R: AsyncBufRead + Unpin + Send;
}

// BinaryCodec reads and writes headerless tuples of little-endian i16,
// one value per channel in `Record::CHANNELS` order.
pub struct BinaryCodec;

#[async_trait]
impl Codec for BinaryCodec {
    async fn encode<S, W>(&self, writer: &mut W, sample: &S) -> Result<()>
    where
        S: FixedRecord + Sync,
        W: AsyncWrite + Unpin + Send,
    {
        let mut raw = vec![0i16; S::CHANNELS.len()];
        sample.encode(&mut raw);
        let bytes: Vec<u8> = raw.iter().flat_map(|v| v.to_le_bytes()).collect();
        writer.write_all(&bytes).await?;
        Ok(())
    }

    async fn decode<S, R>(&self, reader: &mut R) -> Result<Option<S>>
    where
        S: FixedRecord + Send,
        R: AsyncBufRead + Unpin + Send,
    {
        let want = S::CHANNELS.len() * 2;
        let mut buf = vec![0u8; want];
        let mut got = 0;
        while got < want {
            let n = reader.read(&mut buf[got..]).await?;
            if n == 0 {
                break;
            }
            got += n;
        }

        match got {
            0 => Ok(None),
            got if got < want => Err(Error::TruncatedRecord { got, want }),
            _ => {
                let raw: Vec<i16> = buf
                    .chunks_exact(2)
                    .map(|b| i16::from_le_bytes([b[0], b[1]]))
                    .collect();
                Ok(Some(S::decode(&raw)))
            }
        }
    }
}

// CsvCodec writes one comma separated row per record. Decoding skips blank
// lines and header rows.
#[derive(Default)]
pub struct CsvCodec {
    line: std::sync::atomic::AtomicU64,
}

impl CsvCodec {
    pub async fn write_header<S, W>(&self, writer: &mut W) -> Result<()>
    where
        S: Record,
        W: AsyncWrite + Unpin + Send,
    {
        write_row(writer, S::CHANNELS.iter()).await
    }
}

async fn write_row<W, I, T>(writer: &mut W, fields: I) -> Result<()>
where
    W: AsyncWrite + Unpin + Send,
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut buf = Vec::new();
    {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(&mut buf);
        wtr.write_record(fields)?;
        wtr.flush()?;
    }
    writer.write_all(&buf).await?;
    Ok(())
}

#[async_trait]
impl Codec for CsvCodec {
    async fn encode<S, W>(&self, writer: &mut W, sample: &S) -> Result<()>
    where
        S: FixedRecord + Sync,
        W: AsyncWrite + Unpin + Send,
    {
        let mut raw = vec![0i16; S::CHANNELS.len()];
        sample.encode(&mut raw);
        let fields: Vec<String> = raw.iter().map(|v| v.to_string()).collect();
        write_row(writer, &fields).await
    }

    async fn decode<S, R>(&self, reader: &mut R) -> Result<Option<S>>
    where
        S: FixedRecord + Send,
        R: AsyncBufRead + Unpin + Send,
    {
        use std::sync::atomic::Ordering;

        let want = S::CHANNELS.len();
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line).await? == 0 {
                return Ok(None);
            }
            let lineno = self.line.fetch_add(1, Ordering::Relaxed) + 1;
            if line.trim().is_empty() {
                continue;
            }

            let mut rdr = csv::ReaderBuilder::new()
                .has_headers(false)
                .trim(csv::Trim::All)
                .from_reader(line.as_bytes());
            let Some(record) = rdr.records().next().transpose()? else {
                continue;
            };
            if record.iter().eq(S::CHANNELS.iter().copied()) {
                continue;
            }
            if record.len() != want {
                return Err(Error::FieldCount {
                    line: lineno,
                    got: record.len(),
                    want,
                });
            }

            let raw = record
                .iter()
                .map(|field| {
                    field.parse::<i16>().map_err(|_| Error::BadValue {
                        line: lineno,
                        value: field.to_string(),
                    })
                })
                .collect::<Result<Vec<i16>>>()?;
            return Ok(Some(S::decode(&raw)));
        }
    }
}

/// Decodes records until the reader is exhausted.
pub async fn read_samples<S, C, R>(codec: &C, reader: &mut R) -> Result<Vec<S>>
where
    S: FixedRecord + Send,
    C: Codec,
    R: AsyncBufRead + Unpin + Send,
{
    let mut samples = Vec::new();
    while let Some(sample) = codec.decode(reader).await? {
        samples.push(sample);
    }
    Ok(samples)
}

/// Encodes every sample and flushes the writer. Returns the number written.
pub async fn write_samples<'a, S, C, W, I>(codec: &C, writer: &mut W, samples: I) -> Result<usize>
where
    S: FixedRecord + Sync + 'a,
    C: Codec,
    W: AsyncWrite + Unpin + Send,
    I: IntoIterator<Item = &'a S>,
{
    let mut count = 0;
    for sample in samples {
        codec.encode(writer, sample).await?;
        count += 1;
    }
    writer.flush().await?;
    Ok(count)
}
