mod test_chat_broadcast_excludes_sender;
mod test_push_message_reports_unreached;
mod test_push_requires_target_and_message;
