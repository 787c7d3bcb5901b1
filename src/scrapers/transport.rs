//! HTTP access to the report site.
//!
//! The [`FetchPage`] trait is the seam between the orchestrator and the
//! network: the orchestrator asks for one page per [`FetchUnit`] and gets back
//! either a parsed document or nothing. [`HttpTransport`] is the `reqwest`
//! implementation; tests substitute in-memory fetchers.
//!
//! # Request shapes
//!
//! | Stage | Method | Parameters |
//! |-------|--------|------------|
//! | Production, Processing, Commercialization | GET | query `opcao`, `subopcao`, `ano` |
//! | Import, Export | POST | query `opcao`; form `subopcao`, `ano` |

use reqwest::{Client, RequestBuilder};
use std::time::Instant;
use tracing::{debug, instrument, warn};

use super::document::{HtmlPage, TableDocument};
use super::{FetchUnit, HttpMethod};
use crate::config::ScrapeConfig;
use crate::errors::ScrapeError;

/// Fetch the page for one (stage, year, sub-dimension) unit.
///
/// Implementations never fail: any transport problem is logged and reported
/// as `None`, which the orchestrator treats as "zero records for this unit".
pub trait FetchPage {
    /// The parsed page type handed to the extractors.
    type Document: TableDocument;

    async fn fetch(&self, unit: &FetchUnit) -> Option<Self::Document>;
}

/// `reqwest`-backed fetcher. One client (and its connection pool) is reused
/// for every unit of a run.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: ScrapeConfig,
}

impl HttpTransport {
    pub fn new(config: ScrapeConfig) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, config })
    }

    fn request(&self, unit: &FetchUnit) -> RequestBuilder {
        let ano = unit.ano.to_string();
        match unit.method() {
            HttpMethod::Get => {
                let mut query = vec![("opcao", unit.opcao.to_string())];
                if let Some(sub) = unit.subopcao {
                    query.push(("subopcao", sub.code.to_string()));
                }
                query.push(("ano", ano));
                self.client.get(self.config.base_url.clone()).query(&query)
            }
            HttpMethod::Post => {
                let mut url = self.config.base_url.clone();
                url.query_pairs_mut().append_pair("opcao", unit.opcao);
                let mut form = Vec::new();
                if let Some(sub) = unit.subopcao {
                    form.push(("subopcao", sub.code.to_string()));
                }
                form.push(("ano", ano));
                self.client.post(url).form(&form)
            }
        }
    }
}

impl FetchPage for HttpTransport {
    type Document = HtmlPage;

    #[instrument(level = "debug", skip_all, fields(etapa = %unit.etapa, ano = unit.ano, subopcao = unit.subopcao.map(|s| s.code)))]
    async fn fetch(&self, unit: &FetchUnit) -> Option<HtmlPage> {
        let t0 = Instant::now();
        match read_body(self.request(unit)).await {
            Ok(body) => {
                debug!(bytes = body.len(), elapsed_ms = t0.elapsed().as_millis() as u64, "Fetched report page");
                Some(HtmlPage::parse(&body))
            }
            Err(e) => {
                warn!(
                    method = ?unit.method(),
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    error = %e,
                    "Report page fetch failed; treating as no document"
                );
                None
            }
        }
    }
}

async fn read_body(request: RequestBuilder) -> Result<String, reqwest::Error> {
    request.send().await?.error_for_status()?.text().await
}
