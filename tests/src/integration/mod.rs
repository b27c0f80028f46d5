mod ingestion_flow;
mod pipeline_flow;
mod store_flow;
