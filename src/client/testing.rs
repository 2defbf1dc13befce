//! Scripted `ObjectClient` for unit tests: records every request and answers
//! with canned results.

use crate::{
    client::{ClientError, ClientResult, ObjectClient},
    models::{BodyStream, GetObjectOutput, ObjectMeta},
};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Mutex;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Call {
    pub op: &'static str,
    pub bucket: String,
    pub key: String,
    pub content_type: Option<String>,
    pub body: Option<Bytes>,
}

#[derive(Clone, Debug)]
pub(crate) enum GetScript {
    Chunks(ObjectMeta, Vec<ClientResult<Bytes>>),
    NoBody(ObjectMeta),
    Fail(ClientError),
}

#[derive(Debug)]
pub(crate) struct ScriptedClient {
    calls: Mutex<Vec<Call>>,
    put_error: Option<ClientError>,
    head_error: Option<ClientError>,
    delete_error: Option<ClientError>,
    get: GetScript,
}

impl Default for ScriptedClient {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            put_error: None,
            head_error: None,
            delete_error: None,
            get: GetScript::Chunks(ObjectMeta::default(), Vec::new()),
        }
    }
}

impl ScriptedClient {
    pub fn failing_put(mut self, err: ClientError) -> Self {
        self.put_error = Some(err);
        self
    }

    pub fn failing_head(mut self, err: ClientError) -> Self {
        self.head_error = Some(err);
        self
    }

    pub fn failing_delete(mut self, err: ClientError) -> Self {
        self.delete_error = Some(err);
        self
    }

    pub fn get(mut self, script: GetScript) -> Self {
        self.get = script;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &'static str, bucket: &str, key: &str) {
        self.record_call(Call {
            op,
            bucket: bucket.to_string(),
            key: key.to_string(),
            content_type: None,
            body: None,
        });
    }

    fn record_call(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn fail_or(err: &Option<ClientError>) -> ClientResult<()> {
        match err {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ObjectClient for ScriptedClient {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> ClientResult<()> {
        self.record_call(Call {
            op: "put",
            bucket: bucket.to_string(),
            key: key.to_string(),
            content_type: content_type.map(str::to_string),
            body: Some(body),
        });
        Self::fail_or(&self.put_error)
    }

    async fn get_object(&self, bucket: &str, key: &str) -> ClientResult<GetObjectOutput> {
        self.record("get", bucket, key);
        match &self.get {
            GetScript::Chunks(meta, chunks) => {
                let body: BodyStream = Box::pin(futures::stream::iter(chunks.clone()));
                Ok(GetObjectOutput {
                    meta: meta.clone(),
                    body: Some(body),
                })
            }
            GetScript::NoBody(meta) => Ok(GetObjectOutput {
                meta: meta.clone(),
                body: None,
            }),
            GetScript::Fail(err) => Err(err.clone()),
        }
    }

    async fn head_object(&self, bucket: &str, key: &str) -> ClientResult<ObjectMeta> {
        self.record("head", bucket, key);
        Self::fail_or(&self.head_error).map(|_| ObjectMeta::default())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> ClientResult<()> {
        self.record("delete", bucket, key);
        Self::fail_or(&self.delete_error)
    }

    async fn head_bucket(&self, bucket: &str) -> ClientResult<()> {
        self.record("head_bucket", bucket, "");
        Ok(())
    }
}
