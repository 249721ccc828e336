use serde::{ Serialize, Deserialize };
use serde_json::Value;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StartConversationResponse {
    pub conversation_id: String,
    pub question: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SubmitAnswerRequest {
    pub conversation_id: String,
    pub answer: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "status")]
pub enum SubmitAnswerResponse {
    #[serde(rename = "complete")] Complete {
        json: Value,
    },
    #[serde(rename = "in_progress")] InProgress {
        question: String,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub detail: String,
}
