mod test_heartbeat_ping_gets_transport_reply;
mod test_single_client_joins_room;
mod test_switching_rooms_leaves_the_old_one;
