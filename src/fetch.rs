use std::{io::Read, path::PathBuf, str::FromStr, time::Duration};

use tracing::{debug, info};

use crate::Error;

/// The energy expenditure data set (expenditure, obese flag) shipped with the
/// crate.
pub const EMBEDDED_ENERGY: &str = include_str!("../data/energy.csv");

/// Where the two-column group data set comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DataSource {
    #[default]
    Embedded,
    Path(PathBuf),
    Url(String),
}

impl FromStr for DataSource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(if s.is_empty() || s == "embedded" {
            Self::Embedded
        } else if s.starts_with("http://") || s.starts_with("https://") {
            Self::Url(s.to_string())
        } else {
            Self::Path(PathBuf::from(s))
        })
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Embedded => write!(f, "embedded"),
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::Url(u) => write!(f, "{u}"),
        }
    }
}

impl DataSource {
    fn gz(&self) -> bool {
        match self {
            Self::Embedded => false,
            Self::Path(p) => p.extension().is_some_and(|e| e == "gz"),
            Self::Url(u) => u
                .split(['?', '#'])
                .next()
                .is_some_and(|path| path.ends_with(".gz")),
        }
    }

    /// Read the whole data set as text. URLs are fetched with one blocking GET;
    /// a `.gz` suffix means the body is gzip-compressed.
    #[tracing::instrument]
    pub fn read_to_string(&self, timeout: Duration) -> Result<String, Error> {
        let bytes = match self {
            Self::Embedded => return Ok(EMBEDDED_ENERGY.to_string()),
            Self::Path(p) => std::fs::read(p)?,
            Self::Url(url) => {
                info!("Fetching {}", url);
                let client = reqwest::blocking::Client::builder()
                    .timeout(timeout)
                    .build()?;
                let resp = client.get(url).send()?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(Error::HttpStatus {
                        status: status.as_u16(),
                        url: url.clone(),
                    });
                }
                resp.bytes()?.to_vec()
            },
        };
        debug!("Read {} bytes", bytes.len());
        let mut text = String::new();
        if self.gz() {
            flate2::read::GzDecoder::new(bytes.as_slice()).read_to_string(&mut text)?;
        } else {
            text = String::from_utf8(bytes)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{BufRead, BufReader, Write},
        net::TcpListener,
        thread::JoinHandle,
    };

    use test_log::test;

    use super::*;
    use crate::{Frame, Header};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn tmp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(".lmdemo.{}.{}", rand::random::<u64>(), name))
    }

    /// Answer a single request on a local port with `status` and `body`.
    fn serve(status: &str, body: Vec<u8>) -> (String, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let status = status.to_string();
        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut line = String::new();
            // drain the request head
            while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                line.clear();
            }
            let mut stream = reader.into_inner();
            let head = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                body.len()
            );
            // the client may hang up early on an error status
            let _ = stream
                .write_all(head.as_bytes())
                .and_then(|_| stream.write_all(&body))
                .and_then(|_| stream.flush());
        });
        (format!("http://{}", addr), handle)
    }

    #[test]
    fn test_from_str() {
        assert_eq!("".parse::<DataSource>().unwrap(), DataSource::Embedded);
        assert_eq!("embedded".parse::<DataSource>().unwrap(), DataSource::Embedded);
        assert_eq!(
            "https://example.org/energy.csv".parse::<DataSource>().unwrap(),
            DataSource::Url("https://example.org/energy.csv".to_string())
        );
        assert_eq!(
            "data/energy.csv".parse::<DataSource>().unwrap(),
            DataSource::Path(PathBuf::from("data/energy.csv"))
        );
    }

    #[test]
    fn test_gz_detection() {
        assert!(DataSource::Path("a/b.csv.gz".into()).gz());
        assert!(!DataSource::Path("a/b.csv".into()).gz());
        assert!(DataSource::Url("http://h/x.csv.gz?dl=1".to_string()).gz());
        assert!(!DataSource::Url("http://h/x.csv".to_string()).gz());
        assert!(!DataSource::Embedded.gz());
    }

    #[test]
    fn test_embedded() {
        let text = DataSource::Embedded.read_to_string(TIMEOUT).unwrap();
        let frame = Frame::from_csv_reader(text.as_bytes(), Header::Auto).unwrap();
        assert_eq!(frame.nrows(), 22);
        assert_eq!(frame.ncols(), 2);
    }

    #[test]
    fn test_path() {
        let path = tmp_path("energy.csv");
        std::fs::write(&path, "1.0,0\n2.0,1\n").unwrap();
        let text = DataSource::Path(path.clone()).read_to_string(TIMEOUT).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(text, "1.0,0\n2.0,1\n");
    }

    #[test]
    fn test_path_gz() {
        let path = tmp_path("energy.csv.gz");
        let file = std::fs::File::create(&path).unwrap();
        let mut enc = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        enc.write_all(b"1.0,0\n2.0,1\n").unwrap();
        enc.finish().unwrap();
        let text = DataSource::Path(path.clone()).read_to_string(TIMEOUT).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(text, "1.0,0\n2.0,1\n");
    }

    #[test]
    fn test_path_not_found() {
        let source = DataSource::Path("tests/does_not_exist.csv".into());
        assert!(matches!(source.read_to_string(TIMEOUT), Err(Error::Io(_))));
    }

    #[test]
    fn test_url_ok() {
        let (base, handle) = serve("200 OK", b"7.5,0\n9.2,1\n".to_vec());
        let source = DataSource::Url(format!("{}/energy.csv", base));
        let text = source.read_to_string(TIMEOUT).unwrap();
        handle.join().unwrap();
        assert_eq!(text, "7.5,0\n9.2,1\n");
    }

    #[test]
    fn test_url_not_found() {
        let (base, handle) = serve("404 Not Found", b"missing".to_vec());
        let url = format!("{}/energy.csv", base);
        let result = DataSource::Url(url.clone()).read_to_string(TIMEOUT);
        handle.join().unwrap();
        match result {
            Err(Error::HttpStatus { status, url: u }) => {
                assert_eq!(status, 404);
                assert_eq!(u, url);
            },
            other => panic!("expected an http status error, got {other:?}"),
        }
    }

    #[test]
    fn test_url_gz() {
        let mut enc = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        enc.write_all(b"7.5,0\n9.2,1\n").unwrap();
        let (base, handle) = serve("200 OK", enc.finish().unwrap());
        let source = DataSource::Url(format!("{}/energy.csv.gz", base));
        let text = source.read_to_string(TIMEOUT).unwrap();
        handle.join().unwrap();
        assert_eq!(text, "7.5,0\n9.2,1\n");
    }

    #[test]
    fn test_url_unreachable() {
        // port 9 on localhost has nothing listening
        let source = DataSource::Url("http://127.0.0.1:9/energy.csv".to_string());
        assert!(matches!(source.read_to_string(TIMEOUT), Err(Error::Http(_))));
    }
}
